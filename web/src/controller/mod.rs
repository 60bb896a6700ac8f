pub(crate) mod event_stream_controller;
pub(crate) mod root_controller;
