//! Authorization gate for server records

use serverlist_db::Role;

/// Decide whether a caller may act on a server owned by `owner_id`
///
/// Admins may act on every server, game servers only on the ones they
/// registered, players on none.
pub fn is_authorized(role: Role, caller_id: &str, owner_id: &str) -> bool {
    match role {
        Role::Admin => true,
        Role::Server => !caller_id.is_empty() && caller_id == owner_id,
        Role::Player => false,
    }
}
