mod common;

use common::test_config;
use ndn_fetch_engine::engine::stats::StatsSnapshot;
use ndn_fetch_engine::engine::telemetry::{build_telemetry_name, FetchStatus};
use ndn_fetch_engine::name::ContentName;
use ndn_fetch_engine::transport::session::TransportLocator;
use ndn_fetch_engine::{PlaybackSnapshot, PlaybackState, StateEntry};

fn locator() -> TransportLocator {
    TransportLocator::new("example.com".into(), 443, true)
}

fn stats() -> StatsSnapshot {
    StatsSnapshot {
        n_retransmitted: 4,
        n_timeouts: 2,
        n_nacks: 1,
        n_segments: 17,
        avg_rtt_ms: 23.5,
        avg_jitter_ms: 3.25,
    }
}

fn playback() -> PlaybackSnapshot {
    PlaybackSnapshot {
        estimated_bandwidth: 1_500_000.4,
        load_latency_secs: 1.5,
        state_history: vec![
            StateEntry {
                state: PlaybackState::Buffering,
                duration_secs: 2.0,
            },
            StateEntry {
                state: PlaybackState::Playing,
                duration_secs: 30.0,
            },
            StateEntry {
                state: PlaybackState::Buffering,
                duration_secs: 0.75,
            },
            StateEntry {
                state: PlaybackState::Buffering,
                duration_secs: 1.5,
            },
        ],
    }
}

#[test]
fn test_component_order_is_fixed() {
    let name = ContentName::from_path("/ndn/video/seg1.mp4");
    let playback = playback();
    let built = build_telemetry_name(
        FetchStatus::Done,
        &name,
        &test_config(),
        &locator(),
        &stats(),
        Some(&playback),
        1234,
        42,
    )
    .unwrap();

    let components: Vec<&str> = built.components().iter().map(String::as_str).collect();
    assert_eq!(
        components,
        vec![
            "ndn",
            "video-stats",
            "seg1.mp4",
            "status=DONE",
            "hub=wss://example.com/ws/",
            "ip=203.0.113.7",
            "estBw=1500000",
            "nRetransmissions=4",
            "nTimeouts=2",
            "nNack=1",
            "nSegments=17",
            "delay=1234",
            "avgRtt=23.500",
            "avgJitter=3.250",
            "session=42",
            "startupDelay=1.5",
            "rebufferings=2",
            "bufferingDuration=0.75",
            "bufferingDuration=1.5",
        ]
    );
}

#[test]
fn test_identical_inputs_build_identical_names() {
    let name = ContentName::from_path("/ndn/video/seg1.mp4");
    let playback = playback();
    let build = || {
        build_telemetry_name(
            FetchStatus::Error,
            &name,
            &test_config(),
            &locator(),
            &stats(),
            Some(&playback),
            999,
            7,
        )
        .unwrap()
    };
    assert_eq!(build(), build());
}

#[test]
fn test_missing_playback_source_degrades_to_defaults() {
    let name = ContentName::from_path("/ndn/video/seg1.mp4");
    let built = build_telemetry_name(
        FetchStatus::Done,
        &name,
        &test_config(),
        &locator(),
        &stats(),
        None,
        10,
        7,
    )
    .unwrap();

    let rendered = built.to_string();
    assert!(rendered.contains("estBw=0"));
    assert!(rendered.contains("startupDelay=0"));
    assert!(rendered.contains("rebufferings=0"));
    assert!(!rendered.contains("bufferingDuration="));
}

#[test]
fn test_unconfigured_telemetry_prefix_fails_contained() {
    let mut config = test_config();
    config.telemetry_prefix = String::new();
    let name = ContentName::from_path("/ndn/video/seg1.mp4");
    assert!(build_telemetry_name(
        FetchStatus::Done,
        &name,
        &config,
        &locator(),
        &stats(),
        None,
        10,
        7,
    )
    .is_err());
}

#[test]
fn test_name_outside_prefix_rejected() {
    let name = ContentName::from_path("/other/root/seg1.mp4");
    assert!(build_telemetry_name(
        FetchStatus::Done,
        &name,
        &test_config(),
        &locator(),
        &stats(),
        None,
        10,
        7,
    )
    .is_err());
}
