//! Product catalog commands

use async_trait::async_trait;

use crate::protocol::command::{Command, Session, wrong_arity};
use crate::protocol::resp::Value;

/// GETPRODUCT id
pub struct GetProductCmd;

#[async_trait]
impl Command for GetProductCmd {
    async fn execute(&self, items: &[Value], session: &Session) -> Value {
        let id = match items {
            [_, id] => id.as_text(),
            _ => None,
        };
        let Some(id) = id else {
            return wrong_arity("getproduct");
        };

        match session.service.catalog().product(&id) {
            Ok(description) => Value::bulk(description),
            Err(e) => e.into(),
        }
    }
}

/// GETPRODUCTS: product ids in catalog order
pub struct GetProductsCmd;

#[async_trait]
impl Command for GetProductsCmd {
    async fn execute(&self, items: &[Value], session: &Session) -> Value {
        if items.len() != 1 {
            return wrong_arity("getproducts");
        }
        Value::bulk_array(session.service.catalog().product_ids())
    }
}

pub struct GetHomePageCmd;

#[async_trait]
impl Command for GetHomePageCmd {
    async fn execute(&self, items: &[Value], session: &Session) -> Value {
        if items.len() != 1 {
            return wrong_arity("gethomepage");
        }
        Value::bulk(session.service.catalog().home_page())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::command::testing::{request, session};

    #[tokio::test]
    async fn test_products_resolve() {
        let session = session();
        let listed = GetProductsCmd
            .execute(&request(&["GETPRODUCTS"]), &session)
            .await;
        assert_eq!(listed, Value::bulk_array(["seed", "loaf"]));

        let Value::Array(Some(ids)) = listed else {
            panic!("Expected array");
        };
        for id in ids {
            let id = id.as_text().unwrap();
            let result = GetProductCmd
                .execute(&request(&["GETPRODUCT", id.as_str()]), &session)
                .await;
            assert_eq!(
                result,
                Value::bulk(session.service.catalog().product(&id).unwrap())
            );
        }
    }

    #[tokio::test]
    async fn test_unknown_product() {
        let session = session();
        let result = GetProductCmd
            .execute(&request(&["GETPRODUCT", "nonexistent"]), &session)
            .await;
        assert_eq!(
            result,
            Value::error("UNKNOWNPRODUCT unknown product 'nonexistent'")
        );
    }

    #[tokio::test]
    async fn test_home_page() {
        let session = session();
        let result = GetHomePageCmd
            .execute(&request(&["GETHOMEPAGE"]), &session)
            .await;
        assert_eq!(result, Value::bulk("Welcome to the grain shop"));
    }
}
