use chrono::NaiveDate;
use sea_orm::sea_query::{Alias, Expr, Func, SimpleExpr};
use sea_orm::{entity::prelude::*, ConnectionTrait, FromQueryResult, QueryFilter, QuerySelect, Select, Statement};
use serde::{Deserialize, Serialize, Serializer};

use crate::errors::ModelError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_details")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    pub account_type: String,
    pub opening_date: Date,
    pub closing_date: Option<Date>,
    pub lop: f64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Account row as returned to callers. Dates are day-granular and serialize as `YYYY-MM-DD`.
#[derive(Clone, Debug, PartialEq, FromQueryResult, Serialize, Deserialize)]
pub struct UserRecord {
    pub user_id: String,
    pub account_type: String,
    pub opening_date: NaiveDate,
    pub closing_date: Option<NaiveDate>,
    #[serde(serialize_with = "serialize_lop")]
    pub lop: f64,
}

/// Whole values go out as JSON integers (`2`, not `2.0`); anything else as a float.
fn serialize_lop<S: Serializer>(lop: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    const EXACT_I64: f64 = 9_007_199_254_740_992.0; // 2^53
    if lop.fract() == 0.0 && lop.abs() <= EXACT_I64 {
        serializer.serialize_i64(*lop as i64)
    } else {
        serializer.serialize_f64(*lop)
    }
}

impl UserRecord {
    pub fn is_active(&self) -> bool {
        self.closing_date.is_none()
    }
}

/// Body of `POST /users` before shape checks.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct NewUserRecordInput {
    pub user_id: String,
    pub account_type: String,
    pub opening_date: String,
    #[serde(default)]
    pub closing_date: Option<String>,
    pub lop: f64,
}

/// Shape-checked create input. Business rules (key uniqueness, date ordering) stay with the store.
#[derive(Clone, Debug, PartialEq)]
pub struct NewUserRecord {
    pub user_id: String,
    pub account_type: String,
    pub opening_date: NaiveDate,
    pub closing_date: Option<NaiveDate>,
    pub lop: f64,
}

impl TryFrom<NewUserRecordInput> for NewUserRecord {
    type Error = ModelError;

    fn try_from(input: NewUserRecordInput) -> Result<Self, Self::Error> {
        if input.user_id.trim().is_empty() {
            return Err(ModelError::Validation("user_id required".into()));
        }
        if !input.lop.is_finite() {
            return Err(ModelError::Validation("lop must be a finite number".into()));
        }
        let opening_date = parse_date("opening_date", &input.opening_date)?;
        let closing_date = match input.closing_date.as_deref() {
            Some(s) => Some(parse_date("closing_date", s)?),
            None => None,
        };
        Ok(Self {
            user_id: input.user_id,
            account_type: input.account_type,
            opening_date,
            closing_date,
            lop: input.lop,
        })
    }
}

fn parse_date(field: &str, raw: &str) -> Result<NaiveDate, ModelError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| ModelError::Validation(format!("{field} must be a YYYY-MM-DD date, got {raw:?}")))
}

const INSERT_RETURNING_SQL: &str = "INSERT INTO user_details (user_id, account_type, opening_date, closing_date, lop) \
     VALUES ($1, $2, $3, $4, $5) \
     RETURNING user_id, account_type, \
     CAST(opening_date AS DATE) AS opening_date, \
     CAST(closing_date AS DATE) AS closing_date, \
     CAST(lop AS DOUBLE PRECISION) AS lop";

fn cast(col: Column, sql_type: &str) -> SimpleExpr {
    Func::cast_as(Expr::col(col), Alias::new(sql_type)).into()
}

/// Select with both date columns truncated to calendar days, whatever the column precision.
/// `lop` is widened to double precision so integer and numeric columns decode alike.
fn day_granular() -> Select<Entity> {
    Entity::find()
        .select_only()
        .column(Column::UserId)
        .column(Column::AccountType)
        .column_as(cast(Column::OpeningDate, "date"), "opening_date")
        .column_as(cast(Column::ClosingDate, "date"), "closing_date")
        .column_as(cast(Column::Lop, "double precision"), "lop")
}

/// Every row, in store order.
pub async fn list_all<C: ConnectionTrait>(db: &C) -> Result<Vec<UserRecord>, ModelError> {
    day_granular()
        .into_model::<UserRecord>()
        .all(db)
        .await
        .map_err(|e| ModelError::Db(e.to_string()))
}

/// Rows whose `closing_date` is NULL.
pub async fn list_active<C: ConnectionTrait>(db: &C) -> Result<Vec<UserRecord>, ModelError> {
    day_granular()
        .filter(Column::ClosingDate.is_null())
        .into_model::<UserRecord>()
        .all(db)
        .await
        .map_err(|e| ModelError::Db(e.to_string()))
}

/// Single bound `INSERT ... RETURNING`; the row comes back with the same date casts as reads.
pub async fn insert<C: ConnectionTrait>(db: &C, rec: &NewUserRecord) -> Result<UserRecord, ModelError> {
    let stmt = Statement::from_sql_and_values(
        db.get_database_backend(),
        INSERT_RETURNING_SQL,
        [
            rec.user_id.clone().into(),
            rec.account_type.clone().into(),
            rec.opening_date.into(),
            rec.closing_date.into(),
            rec.lop.into(),
        ],
    );
    UserRecord::find_by_statement(stmt)
        .one(db)
        .await
        .map_err(|e| ModelError::Db(e.to_string()))?
        .ok_or_else(|| ModelError::Db("insert returned no row".into()))
}
