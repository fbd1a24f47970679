//! Polaris Finance backend.
//!
//! 金融予測データの upsert / 検索 API と、Supabase (GoTrue) に委譲した
//! ユーザー認証・プロフィール管理を提供する Web バックエンド。
//! 保護対象のルートは Bearer トークン検証ミドルウェアを通過する。

pub mod adapter;
pub mod domain;
pub mod infrastructure;
pub mod usecase;
