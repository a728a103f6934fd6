/// Classification for retry policy.
///
/// Used by the [`Retry`](crate::resilience::Retry) decorator to decide whether
/// another attempt can possibly succeed.
///
/// | Class | Retried? |
/// |-------|----------|
/// | `Never` | No, returned to the caller as is |
/// | `WithBackoff` | Yes, after the next backoff delay |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryClass {
    /// Never retry - the caller gave up, or the request can never succeed.
    Never,

    /// Transient failure - retry after an exponential backoff delay.
    WithBackoff,
}
