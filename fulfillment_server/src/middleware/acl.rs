//! Access control list middleware for the fulfillment server.
//! This middleware can be placed on any route or service.
//!
//! It reads the access key in the `ofp_access_key` header, resolves it against the configured [`AccessKeys`] and
//! checks the resulting claims against the required roles for the route. If the caller holds every required role, the
//! claims are stored in the request extensions and the request continues. Otherwise, a 403 Forbidden response is
//! returned.

use std::{pin::Pin, rc::Rc};

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    error::ErrorInternalServerError,
    web,
    Error,
    HttpMessage,
};
use futures::{
    future::{ok, Ready},
    Future,
};
use log::*;

use crate::{
    auth::{AccessClaims, Role, ACCESS_KEY_HEADER},
    config::AccessKeys,
    errors::ServerError,
};

pub struct AclMiddlewareFactory {
    required_roles: Vec<Role>,
}

impl AclMiddlewareFactory {
    pub fn new(required_roles: &[Role]) -> Self {
        AclMiddlewareFactory { required_roles: required_roles.to_vec() }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AclMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AclMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AclMiddlewareService { required_roles: self.required_roles.clone(), service: Rc::new(service) })
    }
}

pub struct AclMiddlewareService<S> {
    required_roles: Vec<Role>,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AclMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let required_roles = self.required_roles.clone();
        Box::pin(async move {
            let keys = req.app_data::<web::Data<AccessKeys>>().ok_or_else(|| {
                warn!("🔑️ No access keys have been configured for the ACL middleware");
                ErrorInternalServerError("No access keys have been configured")
            })?;
            let presented = req.headers().get(ACCESS_KEY_HEADER).and_then(|v| v.to_str().ok());
            let claims = AccessClaims::from_access_key(keys, presented);
            if claims.has_roles(&required_roles) {
                req.extensions_mut().insert(claims);
                service.call(req).await
            } else {
                let roles = required_roles.iter().map(|r| r.to_string()).collect::<Vec<_>>().join(", ");
                debug!("🔑️ Request to {} denied. Required roles: {roles}", req.path());
                Err(ServerError::InsufficientPermissions(format!("Required roles: {roles}")).into())
            }
        })
    }
}
