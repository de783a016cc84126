//! tokio-postgres backed [`Queryer`]

use async_trait::async_trait;
use tokio_postgres::types::{ToSql, Type};
use tokio_postgres::{Client, Config, NoTls};
use tracing::{debug, error};

use super::builder::Query;
use super::value::{QueryResult, Row, Value};
use super::Queryer;
use crate::error::{Error, Result};

/// Open a client for `config` and drive its connection on a background task
pub async fn connect(config: &Config) -> Result<Client> {
    let (client, connection) = config
        .connect(NoTls)
        .await
        .map_err(|e| Error::query("connect", e))?;

    tokio::spawn(async move {
        if let Err(e) = connection.await {
            error!(error = %e, "connection closed with error");
        }
    });

    Ok(client)
}

#[async_trait]
impl Queryer for Client {
    async fn query(&self, query: &Query) -> Result<QueryResult> {
        let label = query.label();
        let sql = query.sql();
        let owned = bind_params(query.params());
        let params: Vec<&(dyn ToSql + Sync)> = owned
            .iter()
            .map(|p| p.as_ref() as &(dyn ToSql + Sync))
            .collect();

        let stmt = self
            .prepare(&sql)
            .await
            .map_err(|e| Error::query(label, e))?;
        let columns = stmt
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect::<Vec<_>>();

        let rows = Client::query(self, &stmt, &params)
            .await
            .map_err(|e| Error::query(label, e))?;
        debug!(query = label, rows = rows.len(), "catalog query returned");

        let rows = rows
            .iter()
            .map(|row| decode_row(row).map_err(|e| Error::query(label, e)))
            .collect::<Result<Vec<_>>>()?;

        Ok(QueryResult::new(columns, rows))
    }

    async fn cancel(&self) -> Result<()> {
        debug!("sending cancel request");
        self.cancel_token()
            .cancel_query(NoTls)
            .await
            .map_err(|e| Error::query("cancel", e))
    }
}

fn bind_params(params: &[Value]) -> Vec<Box<dyn ToSql + Sync + Send>> {
    params
        .iter()
        .map(|value| -> Box<dyn ToSql + Sync + Send> {
            match value {
                Value::Null => Box::new(None::<String>),
                Value::Boolean(b) => Box::new(*b),
                Value::Integer(i) => Box::new(*i),
                Value::BigInt(i) => Box::new(*i),
                Value::Oid(o) => Box::new(*o),
                Value::Float(f) => Box::new(*f),
                Value::String(s) => Box::new(s.clone()),
                Value::TextArray(items) => Box::new(items.clone()),
            }
        })
        .collect()
}

fn decode_row(row: &tokio_postgres::Row) -> std::result::Result<Row, tokio_postgres::Error> {
    let mut values = Vec::with_capacity(row.len());
    for (idx, column) in row.columns().iter().enumerate() {
        values.push(decode_value(row, idx, column.type_())?);
    }
    Ok(Row::new(values))
}

fn decode_value(
    row: &tokio_postgres::Row,
    idx: usize,
    ty: &Type,
) -> std::result::Result<Value, tokio_postgres::Error> {
    let value = if *ty == Type::BOOL {
        row.try_get::<_, Option<bool>>(idx)?.into()
    } else if *ty == Type::INT2 {
        row.try_get::<_, Option<i16>>(idx)?
            .map(|v| Value::Integer(v as i32))
            .unwrap_or(Value::Null)
    } else if *ty == Type::INT4 {
        row.try_get::<_, Option<i32>>(idx)?.into()
    } else if *ty == Type::INT8 {
        row.try_get::<_, Option<i64>>(idx)?.into()
    } else if *ty == Type::OID {
        row.try_get::<_, Option<u32>>(idx)?.into()
    } else if *ty == Type::FLOAT4 {
        row.try_get::<_, Option<f32>>(idx)?
            .map(|v| Value::Float(v as f64))
            .unwrap_or(Value::Null)
    } else if *ty == Type::FLOAT8 {
        row.try_get::<_, Option<f64>>(idx)?
            .map(Value::Float)
            .unwrap_or(Value::Null)
    } else if *ty == Type::CHAR {
        // "char" arrives as a single signed byte
        row.try_get::<_, Option<i8>>(idx)?
            .map(|v| Value::String((v as u8 as char).to_string()))
            .unwrap_or(Value::Null)
    } else if *ty == Type::TEXT_ARRAY || *ty == Type::NAME_ARRAY || *ty == Type::VARCHAR_ARRAY {
        row.try_get::<_, Option<Vec<Option<String>>>>(idx)?
            .map(|items| {
                Value::TextArray(
                    items
                        .into_iter()
                        .map(|item| item.unwrap_or_else(|| "NULL".to_string()))
                        .collect(),
                )
            })
            .unwrap_or(Value::Null)
    } else {
        match row.try_get::<_, Option<String>>(idx) {
            Ok(v) => v.into(),
            // Catalog queries cast exotic types to text; anything left is shown by type name
            Err(_) => Value::String(format!("<{}>", ty.name())),
        }
    };
    Ok(value)
}
