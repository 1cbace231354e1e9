//! Record types shared by the server and storage backends.

mod ids;
mod invitations;
mod posts;
mod profiles;

pub use ids::*;
pub use invitations::*;
pub use posts::*;
pub use profiles::*;
