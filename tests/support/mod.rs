// ABOUTME: Test support utilities.
// ABOUTME: Provides transport and sleeper doubles for driving the client without a network.

// Each test binary only uses some of these helpers, so allow dead_code.
#[allow(dead_code)]
pub mod fakes;
