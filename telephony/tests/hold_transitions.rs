//! Table of hold re-evaluation outcomes

use callkit_telephony::prelude::*;
use rstest::rstest;

fn connected_peer() -> (std::sync::Arc<Call>, std::sync::Arc<CallPeer>) {
    let call = Call::new("alice@example.org");
    let peer = CallPeer::new(&call, "bob@example.org", "Bob");
    call.add_peer(peer.clone()).unwrap();
    peer.set_state(CallPeerState::Connected).unwrap();
    (call, peer)
}

#[rstest]
#[case(CallPeerState::Connected, true, CallPeerState::OnHoldLocally)]
#[case(CallPeerState::Connected, false, CallPeerState::Connected)]
#[case(CallPeerState::OnHoldLocally, false, CallPeerState::Connected)]
#[case(CallPeerState::OnHoldLocally, true, CallPeerState::OnHoldLocally)]
#[case(CallPeerState::OnHoldRemotely, true, CallPeerState::OnHoldMutually)]
#[case(CallPeerState::OnHoldRemotely, false, CallPeerState::OnHoldRemotely)]
#[case(CallPeerState::OnHoldMutually, false, CallPeerState::OnHoldRemotely)]
#[case(CallPeerState::OnHoldMutually, true, CallPeerState::OnHoldMutually)]
#[case(CallPeerState::Connecting, true, CallPeerState::OnHoldLocally)]
fn test_local_hold(
    #[case] from: CallPeerState,
    #[case] on_hold: bool,
    #[case] expected: CallPeerState,
) {
    assert_eq!(from.with_local_hold(on_hold), expected);
}

#[rstest]
#[case(CallPeerState::Connected, true, CallPeerState::OnHoldRemotely)]
#[case(CallPeerState::Connected, false, CallPeerState::Connected)]
#[case(CallPeerState::OnHoldLocally, true, CallPeerState::OnHoldMutually)]
#[case(CallPeerState::OnHoldLocally, false, CallPeerState::OnHoldLocally)]
#[case(CallPeerState::OnHoldRemotely, false, CallPeerState::Connected)]
#[case(CallPeerState::OnHoldMutually, false, CallPeerState::OnHoldLocally)]
#[case(CallPeerState::OnHoldMutually, true, CallPeerState::OnHoldMutually)]
fn test_remote_hold(
    #[case] from: CallPeerState,
    #[case] on_hold: bool,
    #[case] expected: CallPeerState,
) {
    assert_eq!(from.with_remote_hold(on_hold), expected);
}

#[test]
fn test_full_hold_round_trip_on_live_peer() {
    let (call, peer) = connected_peer();

    peer.put_on_hold(true).unwrap();
    assert_eq!(peer.state(), CallPeerState::OnHoldLocally);
    peer.set_remotely_on_hold(true).unwrap();
    assert_eq!(peer.state(), CallPeerState::OnHoldMutually);
    peer.put_on_hold(false).unwrap();
    assert_eq!(peer.state(), CallPeerState::OnHoldRemotely);
    peer.set_remotely_on_hold(false).unwrap();
    assert_eq!(peer.state(), CallPeerState::Connected);

    assert_eq!(call.state(), CallState::InProgress);
}

#[rstest]
#[case(CallPeerState::Disconnected)]
#[case(CallPeerState::Failed)]
fn test_hold_rejected_after_terminal(#[case] terminal: CallPeerState) {
    let (_call, peer) = connected_peer();
    peer.set_state(terminal).unwrap();
    assert!(matches!(
        peer.put_on_hold(true),
        Err(CallError::PeerTerminated { .. })
    ));
    assert!(peer.set_remotely_on_hold(true).is_err());
    assert_eq!(peer.state(), terminal);
}
