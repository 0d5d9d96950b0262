/// Authentication of inbound payment provider callbacks
pub mod signature;

pub use signature::{
    constant_time_eq, sign_payload, verify_signature, SignatureError, SIGNATURE_HEADER,
    TIMESTAMP_HEADER,
};
