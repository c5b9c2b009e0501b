// src/api/params.rs
use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpMessage, HttpRequest, web};
use futures::future::LocalBoxFuture;
use serde::de::DeserializeOwned;

/// Request parameters bound from a JSON body or a url-encoded form,
/// chosen by content type. Binding never fails the request: a body that
/// does not bind yields `Bound(None)` and the handler answers with a
/// parameter error in the usual JSON shape.
pub struct Bound<T>(pub Option<T>);

impl<T> Bound<T> {
    pub fn into_inner(self) -> Option<T> {
        self.0
    }
}

impl<T: DeserializeOwned + 'static> FromRequest for Bound<T> {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let path = req.path().to_string();
        if req.content_type() == "application/json" {
            let fut = web::Json::<T>::from_request(req, payload);
            Box::pin(async move {
                Ok(Bound(match fut.await {
                    Ok(json) => Some(json.into_inner()),
                    Err(e) => {
                        log::debug!("[params] {}: json body did not bind: {}", path, e);
                        None
                    }
                }))
            })
        } else {
            let fut = web::Form::<T>::from_request(req, payload);
            Box::pin(async move {
                Ok(Bound(match fut.await {
                    Ok(form) => Some(form.into_inner()),
                    Err(e) => {
                        log::debug!("[params] {}: form body did not bind: {}", path, e);
                        None
                    }
                }))
            })
        }
    }
}
