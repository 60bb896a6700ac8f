// Testing Tools Library
//
// Manual probes for a running gateway.
// Currently includes:
// - stream-probe: follows /events and flags consecutive duplicate messages

pub mod output;
pub mod stream_client;
