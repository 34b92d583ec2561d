//! Voicegate Core Library
//!
//! Domain types shared by the relay service: the per-call conversation
//! transcript and the completion client used to obtain assistant replies
//! from an OpenAI-compatible endpoint.

pub mod completion;
pub mod transcript;
