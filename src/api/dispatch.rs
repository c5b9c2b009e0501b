// src/api/dispatch.rs
use crate::response::Reply;
use actix_web::http::StatusCode;
use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;

/// Runs a handler body, turning a panic into the `Failed` variant so the
/// request still gets exactly one rendered response.
pub async fn recover<F>(handler: F) -> Reply
where
    F: Future<Output = Reply>,
{
    match AssertUnwindSafe(handler).catch_unwind().await {
        Ok(reply) => {
            log::debug!("[dispatch] replying {}", reply);
            reply
        }
        Err(panic) => {
            log::error!(
                "[dispatch] response not set, handler panicked: {}",
                panic_message(panic.as_ref())
            );
            Reply::failed(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s
    } else {
        "<non-string panic>"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::St;

    #[actix_rt::test]
    async fn passes_replies_through() {
        let reply = recover(async { Reply::json_error(St::ParamErr) }).await;
        assert!(matches!(reply, Reply::Json { st: St::ParamErr, .. }));
    }

    fn explode() -> Reply {
        panic!("boom")
    }

    #[actix_rt::test]
    async fn panic_becomes_failed_500() {
        let reply = recover(async { explode() }).await;
        assert!(matches!(
            reply,
            Reply::Failed { code } if code == StatusCode::INTERNAL_SERVER_ERROR
        ));
    }
}
