//! Model types for callkit-telephony

mod call_state;
mod ids;
mod member_state;
mod peer_state;

pub use call_state::CallState;
pub use ids::{CallId, MemberId, PeerId};
pub use member_state::ConferenceMemberState;
pub use peer_state::CallPeerState;
