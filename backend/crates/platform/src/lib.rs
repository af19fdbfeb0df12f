//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Password hashing (Argon2id, NIST SP 800-63B compliant)
//! - Cryptographic utilities (random tokens, Base64)
//! - Cookie management
//! - Outbound mail interface

pub mod cookie;
pub mod crypto;
pub mod mailer;
pub mod password;
