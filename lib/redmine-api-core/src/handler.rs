//! Content handlers: typed transforms over a received response.
//!
//! A handler consumes one input (a wire response, a decoded response, ...)
//! and produces a typed result or an [`Error`](crate::Error). Handlers
//! compose with [`compose`] or [`ContentHandlerExt::and_then`], so a decoding
//! step written once can sit in front of any parser.
//!
//! # Example
//!
//! ```
//! use redmine_api_core::{ContentHandler, ContentHandlerExt, Result};
//!
//! let parse = |s: String| -> Result<usize> { Ok(s.len()) };
//! let double = |n: usize| -> Result<usize> { Ok(n * 2) };
//!
//! let handler = parse.and_then(double);
//! assert_eq!(handler.process("four".to_string()).expect("ok"), 8);
//! ```

use std::fmt;
use std::marker::PhantomData;

use crate::Result;

/// Transforms an `I` into an `O`, or fails.
pub trait ContentHandler<I, O>: Send + Sync {
    /// Processes the input.
    fn process(&self, input: I) -> Result<O>;
}

impl<I, O, F> ContentHandler<I, O> for F
where
    F: Fn(I) -> Result<O> + Send + Sync,
{
    fn process(&self, input: I) -> Result<O> {
        self(input)
    }
}

/// Two handlers run back to back: `first` (I to M) then `second` (M to O).
pub struct Compose<A, B, M> {
    first: A,
    second: B,
    _intermediate: PhantomData<fn(M) -> M>,
}

impl<A: Clone, B: Clone, M> Clone for Compose<A, B, M> {
    fn clone(&self) -> Self {
        Self {
            first: self.first.clone(),
            second: self.second.clone(),
            _intermediate: PhantomData,
        }
    }
}

impl<A: fmt::Debug, B: fmt::Debug, M> fmt::Debug for Compose<A, B, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Compose")
            .field("first", &self.first)
            .field("second", &self.second)
            .finish()
    }
}

impl<I, M, O, A, B> ContentHandler<I, O> for Compose<A, B, M>
where
    A: ContentHandler<I, M>,
    B: ContentHandler<M, O>,
{
    fn process(&self, input: I) -> Result<O> {
        let intermediate = self.first.process(input)?;
        self.second.process(intermediate)
    }
}

/// Runs `first`, then feeds its output to `second`.
pub fn compose<I, M, O, A, B>(first: A, second: B) -> Compose<A, B, M>
where
    A: ContentHandler<I, M>,
    B: ContentHandler<M, O>,
{
    Compose {
        first,
        second,
        _intermediate: PhantomData,
    }
}

/// Combinators available on every [`ContentHandler`].
pub trait ContentHandlerExt<I, M>: ContentHandler<I, M> + Sized {
    /// Chains `next` after this handler.
    fn and_then<O, B>(self, next: B) -> Compose<Self, B, M>
    where
        B: ContentHandler<M, O>,
    {
        compose(self, next)
    }
}

impl<I, M, T: ContentHandler<I, M>> ContentHandlerExt<I, M> for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn closures_are_handlers() {
        let handler = |n: u32| -> Result<u32> { Ok(n + 1) };
        assert_eq!(handler.process(1).expect("ok"), 2);
    }

    #[test]
    fn compose_runs_in_order() {
        let to_text = |n: u32| -> Result<String> { Ok(n.to_string()) };
        let suffix = |s: String| -> Result<String> { Ok(format!("{s}!")) };

        let handler = compose(to_text, suffix);
        assert_eq!(handler.process(7).expect("ok"), "7!");
    }

    #[test]
    fn first_failure_short_circuits() {
        let fail = |_: u32| -> Result<u32> { Err(Error::format("bad body")) };
        let unreachable = |_: u32| -> Result<u32> { Err(Error::internal("second handler ran")) };

        let err = fail.and_then(unreachable).process(1).expect_err("fails");
        assert!(err.is_format());
    }
}
