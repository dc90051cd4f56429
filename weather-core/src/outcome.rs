//! Failure-explicit composition on top of [`Result`].
//!
//! The synchronous combinators (`map`, `map_err`, `and_then`, `unwrap_or`, ...)
//! are the ones `Result` already provides. This module adds the two pieces
//! the pipeline needs on top:
//!
//! - [`AsyncResultExt::and_then_async`]: monadic bind where the continuation
//!   is asynchronous and only awaited on `Ok`.
//! - [`from_future`]: the single bridge from a collaborator's own error type
//!   (usually `anyhow::Error`) into the typed [`WeatherError`](crate::WeatherError).
//!
//! ```
//! use weather_core::outcome::AsyncResultExt;
//!
//! # async fn demo() {
//! let doubled = Ok::<_, String>(21)
//!     .and_then_async(|v| async move { Ok::<_, String>(v * 2) })
//!     .await;
//! assert_eq!(doubled, Ok(42));
//! # }
//! ```

use std::future::Future;

use crate::error::WeatherError;

/// Result of every pipeline step.
pub type Outcome<T> = Result<T, WeatherError>;

pub trait AsyncResultExt<T, E> {
    /// Await `f(value)` when `self` is `Ok`; pass `Err` through untouched.
    fn and_then_async<U, F, Fut>(self, f: F) -> impl Future<Output = Result<U, E>>
    where
        F: FnOnce(T) -> Fut,
        Fut: Future<Output = Result<U, E>>;
}

impl<T, E> AsyncResultExt<T, E> for Result<T, E> {
    fn and_then_async<U, F, Fut>(self, f: F) -> impl Future<Output = Result<U, E>>
    where
        F: FnOnce(T) -> Fut,
        Fut: Future<Output = Result<U, E>>,
    {
        async move {
            match self {
                Ok(value) => f(value).await,
                Err(error) => Err(error),
            }
        }
    }
}

/// Await a collaborator call and convert its failure with `map_error`.
///
/// Collaborators report failures in their own error type; this is the only
/// place where such a failure turns into a typed pipeline error.
pub async fn from_future<T, X, E, Fut, M>(future: Fut, map_error: M) -> Result<T, E>
where
    Fut: Future<Output = Result<T, X>>,
    M: FnOnce(X) -> E,
{
    future.await.map_err(map_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use proptest::prelude::*;
    use std::cell::Cell;

    fn boom() -> WeatherError {
        WeatherError::validation("city is required", "city")
    }

    proptest! {
        #[test]
        fn ok_is_ok_and_unwraps_to_value(v in any::<i64>()) {
            let r: Result<i64, String> = Ok(v);
            prop_assert!(r.is_ok());
            prop_assert!(!r.is_err());
            prop_assert_eq!(r.unwrap(), v);
        }

        #[test]
        fn err_is_err_and_unwraps_to_error(e in ".*") {
            let r: Result<i64, String> = Err(e.clone());
            prop_assert!(r.is_err());
            prop_assert!(!r.is_ok());
            prop_assert_eq!(r.unwrap_err(), e);
        }

        #[test]
        fn unwrap_or_returns_default_only_on_err(v in any::<i32>(), d in any::<i32>()) {
            prop_assert_eq!(Ok::<_, ()>(v).unwrap_or(d), v);
            prop_assert_eq!(Err::<i32, _>(()).unwrap_or(d), d);
        }
    }

    #[test]
    fn map_skips_function_on_err() {
        let calls = Cell::new(0);
        let r: Outcome<i32> = Err(boom());

        let mapped = r.map(|v| {
            calls.set(calls.get() + 1);
            v + 1
        });

        assert_eq!(calls.get(), 0);
        assert_eq!(mapped.unwrap_err().kind(), ErrorKind::Validation);
    }

    #[test]
    fn map_err_skips_function_on_ok() {
        let calls = Cell::new(0);
        let r: Outcome<i32> = Ok(7);

        let mapped = r.map_err(|e| {
            calls.set(calls.get() + 1);
            e
        });

        assert_eq!(calls.get(), 0);
        assert_eq!(mapped.unwrap(), 7);
    }

    #[test]
    fn and_then_short_circuits_whole_chain() {
        let calls = Cell::new(0);
        let step = |v: i32| -> Outcome<i32> {
            calls.set(calls.get() + 1);
            Ok(v + 1)
        };

        let r = Err(boom()).and_then(step).and_then(step).and_then(step);

        assert_eq!(calls.get(), 0);
        match r {
            Err(WeatherError::Validation { field, .. }) => assert_eq!(field.as_deref(), Some("city")),
            other => panic!("expected the original validation error, got {other:?}"),
        }
    }

    #[test]
    fn and_then_flattens_on_ok() {
        let r: Outcome<i32> = Ok(1);
        assert_eq!(r.and_then(|v| Ok(v * 10)).unwrap(), 10);
    }

    #[test]
    #[should_panic]
    fn unwrap_on_err_panics() {
        let r: Outcome<i32> = Err(boom());
        let _ = r.unwrap();
    }

    #[test]
    #[should_panic]
    fn unwrap_err_on_ok_panics() {
        let r: Outcome<i32> = Ok(1);
        let _ = r.unwrap_err();
    }

    #[tokio::test]
    async fn and_then_async_awaits_only_on_ok() {
        let calls = Cell::new(0);

        let ok = Ok::<_, String>(2)
            .and_then_async(|v| {
                calls.set(calls.get() + 1);
                async move { Ok::<_, String>(v * 3) }
            })
            .await;
        assert_eq!(ok, Ok(6));
        assert_eq!(calls.get(), 1);

        let err = Err::<i32, _>("stop".to_string())
            .and_then_async(|v| {
                calls.set(calls.get() + 1);
                async move { Ok::<_, String>(v * 3) }
            })
            .await;
        assert_eq!(err, Err("stop".to_string()));
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn from_future_wraps_success() {
        let r: Outcome<u8> = from_future(async { Ok::<_, anyhow::Error>(5) }, |e| {
            WeatherError::from_collaborator("lookup failed", e)
        })
        .await;
        assert_eq!(r.unwrap(), 5);
    }

    #[tokio::test]
    async fn from_future_maps_failure_through_mapper() {
        let r: Outcome<u8> = from_future(
            async { Err::<u8, _>(anyhow::anyhow!("socket closed")) },
            |e| WeatherError::from_collaborator("lookup failed", e),
        )
        .await;

        let err = r.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Infrastructure);
        assert_eq!(err.message(), "lookup failed");
    }
}
