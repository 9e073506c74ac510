//! Resolver domain - member filters and membership resolution

mod filter;
mod members;

pub use filter::{split_list, MemberFilter};
pub use members::{find_teams, MemberResolver};
