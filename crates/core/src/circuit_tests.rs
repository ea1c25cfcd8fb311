// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn cfg() -> CircuitBreakerConfig {
    CircuitBreakerConfig { threshold: 3, cooldown_ms: 1_000 }
}

#[test]
fn closed_allows_requests() {
    let mut cb = CircuitBreakerState::new();
    assert!(cb.allow(&cfg(), 0));
    assert!(!cb.is_open());
}

#[test]
fn opens_after_threshold_consecutive_failures() {
    let cfg = cfg();
    let mut cb = CircuitBreakerState::new();
    cb.on_failure(&cfg, 0);
    cb.on_failure(&cfg, 0);
    assert!(!cb.is_open());
    cb.on_failure(&cfg, 0);
    assert!(cb.is_open());
}

#[test]
fn open_breaker_fails_fast_until_cooldown_elapses() {
    let cfg = cfg();
    let mut cb = CircuitBreakerState::new();
    for _ in 0..3 {
        cb.on_failure(&cfg, 100);
    }
    assert!(!cb.allow(&cfg, 500));
    assert!(!cb.allow(&cfg, 1_099));
    assert!(cb.allow(&cfg, 1_100));
}

#[test]
fn success_in_half_open_fully_closes_breaker() {
    let cfg = cfg();
    let mut cb = CircuitBreakerState::new();
    for _ in 0..3 {
        cb.on_failure(&cfg, 0);
    }
    assert!(cb.allow(&cfg, cfg.cooldown_ms));
    cb.on_success();
    assert!(!cb.is_open());
    assert_eq!(cb.consecutive_failures(), 0);
}

#[test]
fn failure_in_half_open_reopens_with_fresh_timestamp() {
    let cfg = cfg();
    let mut cb = CircuitBreakerState::new();
    for _ in 0..3 {
        cb.on_failure(&cfg, 0);
    }
    assert!(cb.allow(&cfg, cfg.cooldown_ms));
    cb.on_failure(&cfg, cfg.cooldown_ms);
    assert!(cb.is_open());
    assert!(!cb.allow(&cfg, cfg.cooldown_ms + 1));
    assert!(cb.allow(&cfg, cfg.cooldown_ms * 2));
}

#[test]
fn success_resets_consecutive_failure_count() {
    let cfg = cfg();
    let mut cb = CircuitBreakerState::new();
    cb.on_failure(&cfg, 0);
    cb.on_failure(&cfg, 0);
    cb.on_success();
    assert_eq!(cb.consecutive_failures(), 0);
    cb.on_failure(&cfg, 0);
    cb.on_failure(&cfg, 0);
    assert!(!cb.is_open());
}
