//! Core domain types for the courier dispatch engine.
//!
//! The model covers the records a dispatch cycle works with (orders, couriers,
//! shops and the travel matrices between them) and the candidate deliveries
//! the solver produces. Collaborators that sit outside the route-construction
//! core are expressed as traits: matrix providers, route evaluators, cloud
//! finders, snapshot sources and result sinks.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod cloud;
pub mod courier;
pub mod delivery;
pub mod evaluator;
pub mod order;
pub mod planner;
pub mod shop;
pub mod sink;
pub mod source;
pub mod time;
pub mod travel;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use cloud::{CloudError, CloudFinder, CloudRequest};
pub use courier::{Courier, CourierId, MAX_ROUTE_LEN, VehicleTypeId};
pub use delivery::{Delivery, DeliveryDraft, DeliveryStop};
pub use evaluator::{EvaluationError, RouteEvaluator, RouteRequest};
pub use order::{Order, OrderId, OrderStatus};
pub use planner::{RoutePlanner, departure_time};
pub use shop::{Shop, ShopId};
pub use sink::{DeliverySink, RejectedOrder, SinkError};
pub use source::{DispatchSnapshot, DispatchSource, SourceError};
pub use time::{TimeWindow, TimeWindowError, Timestamp};
pub use travel::{DistanceMatrix, Leg, TravelMatrix, TravelMatrixError, TravelMatrixProvider};
