//! Property-based tests for call and peer state machines

use std::sync::Arc;

use callkit_telephony::prelude::*;
use callkit_telephony::CallChangeEvent;
use parking_lot::Mutex;
use proptest::prelude::*;

// ============================================================================
// Test Helpers
// ============================================================================

#[derive(Default)]
struct CallStates(Mutex<Vec<CallState>>);

impl CallChangeListener for CallStates {
    fn call_state_changed(&self, event: &CallChangeEvent) {
        self.0.lock().push(event.new_state());
    }
}

#[derive(Debug, Clone)]
enum Op {
    SetState(usize, CallPeerState),
    LocalHold(usize, bool),
    RemoteHold(usize, bool),
    Remove(usize),
}

fn peer_state_strategy() -> impl Strategy<Value = CallPeerState> {
    prop_oneof![
        Just(CallPeerState::Unknown),
        Just(CallPeerState::InitiatingCall),
        Just(CallPeerState::IncomingCall),
        Just(CallPeerState::Connecting),
        Just(CallPeerState::ConnectingWithEarlyMedia),
        Just(CallPeerState::AlertingRemoteSide),
        Just(CallPeerState::Connected),
        Just(CallPeerState::Busy),
        Just(CallPeerState::OnHoldLocally),
        Just(CallPeerState::OnHoldRemotely),
        Just(CallPeerState::OnHoldMutually),
        Just(CallPeerState::Disconnected),
        Just(CallPeerState::Failed),
    ]
}

fn op_strategy(peers: usize) -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..peers, peer_state_strategy()).prop_map(|(i, s)| Op::SetState(i, s)),
        (0..peers, any::<bool>()).prop_map(|(i, on)| Op::LocalHold(i, on)),
        (0..peers, any::<bool>()).prop_map(|(i, on)| Op::RemoteHold(i, on)),
        (0..peers).prop_map(Op::Remove),
    ]
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Whatever happens to the peers, the call visits each state at most once,
    /// in forward order, and ends exactly when its last peer is gone.
    #[test]
    fn prop_call_lifecycle_is_forward_only(
        peer_count in 1usize..4,
        ops in prop::collection::vec(op_strategy(3), 0..40),
    ) {
        let call = Call::new("alice@example.org");
        let recorder = Arc::new(CallStates::default());
        call.add_call_change_listener(recorder.clone());

        let peers: Vec<_> = (0..peer_count)
            .map(|i| {
                let peer = CallPeer::new(&call, format!("peer{}@example.org", i), format!("Peer {}", i));
                call.add_peer(peer.clone()).unwrap();
                peer
            })
            .collect();

        for op in ops {
            match op {
                Op::SetState(i, s) => { let _ = peers[i % peer_count].set_state(s); }
                Op::LocalHold(i, on) => { let _ = peers[i % peer_count].put_on_hold(on); }
                Op::RemoteHold(i, on) => { let _ = peers[i % peer_count].set_remotely_on_hold(on); }
                Op::Remove(i) => { call.remove_peer(&peers[i % peer_count]); }
            }
        }

        let states = recorder.0.lock().clone();
        prop_assert!(!states.contains(&CallState::Initialization));
        prop_assert!(
            states.is_empty()
                || states == [CallState::InProgress]
                || states == [CallState::Ended]
                || states == [CallState::InProgress, CallState::Ended]
        );
        prop_assert_eq!(call.peer_count() == 0, call.state() == CallState::Ended);
    }

    /// A peer that reached a terminal state never leaves it.
    #[test]
    fn prop_terminal_peer_state_is_absorbing(
        terminal in prop_oneof![Just(CallPeerState::Disconnected), Just(CallPeerState::Failed)],
        later in prop::collection::vec(peer_state_strategy(), 0..10),
    ) {
        let call = Call::new("alice@example.org");
        let peer = CallPeer::new(&call, "bob@example.org", "Bob");
        peer.set_state(terminal).unwrap();

        for state in later {
            let result = peer.set_state(state);
            prop_assert_eq!(result.is_ok(), state == terminal);
            prop_assert_eq!(peer.state(), terminal);
        }
    }

    /// Hold flags fully determine the hold state of a connected peer.
    #[test]
    fn prop_hold_state_matches_flags(
        flips in prop::collection::vec((any::<bool>(), any::<bool>()), 1..20),
    ) {
        let call = Call::new("alice@example.org");
        let peer = CallPeer::new(&call, "bob@example.org", "Bob");
        peer.set_state(CallPeerState::Connected).unwrap();

        for (local, on) in flips {
            if local {
                peer.put_on_hold(on).unwrap();
            } else {
                peer.set_remotely_on_hold(on).unwrap();
            }
            let expected = match (peer.is_locally_on_hold(), peer.is_remotely_on_hold()) {
                (false, false) => CallPeerState::Connected,
                (true, false) => CallPeerState::OnHoldLocally,
                (false, true) => CallPeerState::OnHoldRemotely,
                (true, true) => CallPeerState::OnHoldMutually,
            };
            prop_assert_eq!(peer.state(), expected);
        }
    }
}
