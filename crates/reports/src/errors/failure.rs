/// Classification of a failed report run, from the caller's point of view.
///
/// Nothing in this crate retries. The class only tells the host what kind of
/// follow-up makes sense.
///
/// | Class | Typical cause | Follow-up |
/// |-------|---------------|-----------|
/// | `DataNotReady` | A resolution stage returned no candidates | Re-invoke later |
/// | `Configuration` | Bad key material or selector values | Fix the input |
/// | `Transport` | Network, HTTP status, auth or corrupt payload | Check connectivity and credentials |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FailureClass {
    /// The remote service has not (yet) produced the requested report.
    DataNotReady,

    /// The invocation itself is wrong: credentials or parameters.
    Configuration,

    /// The exchange with the remote service failed.
    Transport,
}
