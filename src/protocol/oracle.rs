//! Price oracle commands

use async_trait::async_trait;

use crate::error::StoreError;
use crate::protocol::command::{Command, Session, wrong_arity};
use crate::protocol::resp::Value;

/// GETPRICE: current price as a decimal bulk string
pub struct GetPriceCmd;

#[async_trait]
impl Command for GetPriceCmd {
    async fn execute(&self, items: &[Value], session: &Session) -> Value {
        if items.len() != 1 {
            return wrong_arity("getprice");
        }
        Value::bulk(session.service.oracle().price().to_string())
    }
}

/// GETLASTPRICEUPDATE: nanosecond timestamp of the current price
pub struct GetLastPriceUpdateCmd;

#[async_trait]
impl Command for GetLastPriceUpdateCmd {
    async fn execute(&self, items: &[Value], session: &Session) -> Value {
        if items.len() != 1 {
            return wrong_arity("getlastpriceupdate");
        }
        let last_updated = session.service.oracle().last_updated();
        Value::Integer(i64::try_from(last_updated).unwrap_or(i64::MAX))
    }
}

/// UPDATEPRICE price
pub struct UpdatePriceCmd;

impl UpdatePriceCmd {
    fn parse(items: &[Value]) -> Option<Result<f64, StoreError>> {
        match items {
            [_, price] => {
                let text = price.as_text()?;
                Some(text.trim().parse::<f64>().map_err(|_| {
                    StoreError::InvalidValue(format!("'{}' is not a number", text))
                }))
            }
            _ => None,
        }
    }
}

#[async_trait]
impl Command for UpdatePriceCmd {
    async fn execute(&self, items: &[Value], session: &Session) -> Value {
        let price = match Self::parse(items) {
            Some(Ok(price)) => price,
            Some(Err(e)) => return e.into(),
            None => return wrong_arity("updateprice"),
        };

        match session.service.oracle().update_price(price) {
            Ok(_) => Value::ok(),
            Err(e) => e.into(),
        }
    }
}
