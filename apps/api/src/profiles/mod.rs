// Contact profiles: the user's name, email, WhatsApp number and avatar.
// Reminder delivery resolves channels through `ProfileStore::contact_for`.

pub mod handlers;
pub mod images;
#[cfg(test)]
pub mod memory;
pub mod store;
pub mod validation;
