//! # handwitch-hands
//!
//! Hands are named, parameterized HTTP request templates. This crate loads and validates their
//! descriptions (JSON or YAML), parses parameter values typed in by users, renders help texts, and
//! executes a hand: build the URL, call it, render the JSON response through the hand's body template.

pub mod error;
pub mod hand;
pub mod param;
pub mod source;
mod template;

pub use error::{HandError, Result};
pub use hand::{HandDescriptor, HandProcessor, HttpHand};
pub use param::{ParamDestination, ParamInfo, ParamType, ParamValue, Params};
pub use source::{DescriptionsSource, HandRegistry, HandSource};
