//! Data models for the backend API.
//!
//! - `AwsCredentials`: map bootstrap payload from `/api/aws-credentials/`
//! - `AccidentRecord`: one avalanche accident from `/api/accidents/`

pub mod accident;
pub mod credentials;

pub use accident::AccidentRecord;
pub use credentials::AwsCredentials;
