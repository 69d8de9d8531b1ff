//! REST contract client.
//!
//! [`ApiClient`] issues the user and resource calls and returns raw
//! [`ApiResponse`]s; the [`Schema`] types decide whether a body honors its
//! contract.

mod client;
mod schema;

pub use client::{ApiClient, ApiResponse, API_KEY_HEADER};
pub use schema::{
    json_contains, CreatedUser, PatchedUser, ResourceData, Schema, SingleResource, SingleUser,
    Support, UpdatedUser, UserData, UserPayload,
};
