use std::str::FromStr;
use std::time::Duration;

use crate::models::{
    Dish, NewDish, NewReservation, Reservation, ReservationStatus, UnknownVariant, User,
};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{FromRow, PgPool, Result, Row};

/// Connects to a PostgreSQL database with the given `db_url`, returning a connection pool for accessing it
pub async fn connect_sqlx(db_url: &str) -> sqlx::PgPool {
    PgPoolOptions::new()
        .acquire_timeout(Duration::from_secs(2))
        .idle_timeout(Duration::from_secs(30))
        .max_connections(32)
        .min_connections(4)
        .connect(db_url)
        .await
        .expect("Could not connect to the database")
}

/// True when the error is a Postgres unique-constraint violation (23505).
/// Handlers use this to turn racing duplicate inserts into tailored 400s.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

/// Decode a TEXT column into one of the closed domain enums.
fn decode_col<T>(row: &PgRow, col: &str) -> Result<T>
where
    T: FromStr<Err = UnknownVariant>,
{
    let raw: String = row.try_get(col)?;
    raw.parse().map_err(|e: UnknownVariant| sqlx::Error::ColumnDecode {
        index: col.to_owned(),
        source: Box::new(e),
    })
}

impl FromRow<'_, PgRow> for User {
    fn from_row(row: &PgRow) -> Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            hashed_password: row.try_get("hashed_password")?,
            role: decode_col(row, "role")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl FromRow<'_, PgRow> for Dish {
    fn from_row(row: &PgRow) -> Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            image_url: row.try_get("image_url")?,
            description: row.try_get("description")?,
            price: row.try_get("price")?,
            category: decode_col(row, "category")?,
            is_available: row.try_get("is_available")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl FromRow<'_, PgRow> for Reservation {
    fn from_row(row: &PgRow) -> Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            guest_name: row.try_get("guest_name")?,
            email: row.try_get("email")?,
            number_of_guests: row.try_get("number_of_guests")?,
            date: row.try_get("date")?,
            status: decode_col(row, "status")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

pub struct PostgreDatabase {
    sqlx_db: PgPool,
}

impl PostgreDatabase {
    pub fn new(sqlx_db: PgPool) -> Self {
        PostgreDatabase { sqlx_db }
    }

    /// Create a new user using a reference to a `User` struct
    pub async fn create_user(&self, user: &User) -> Result<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO app_user (name, email, hashed_password, role)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.hashed_password)
        .bind(user.role.as_str())
        .fetch_one(&self.sqlx_db)
        .await
    }

    /// Get a user by ID
    pub async fn get_user_by_id(&self, user_id: i32) -> Result<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM app_user WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.sqlx_db)
            .await
    }

    /// Get a user by email
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM app_user WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.sqlx_db)
            .await
    }

    /// All dishes, menu order: category first, then name.
    pub async fn list_dishes(&self) -> Result<Vec<Dish>> {
        sqlx::query_as::<_, Dish>("SELECT * FROM dish ORDER BY category, name")
            .fetch_all(&self.sqlx_db)
            .await
    }

    /// Get a dish by ID
    pub async fn get_dish_by_id(&self, id: i32) -> Result<Option<Dish>> {
        sqlx::query_as::<_, Dish>("SELECT * FROM dish WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.sqlx_db)
            .await
    }

    /// Create a new dish from an already-validated record
    pub async fn create_dish(&self, dish: &NewDish) -> Result<Dish> {
        sqlx::query_as::<_, Dish>(
            r#"
            INSERT INTO dish (name, image_url, description, price, category, is_available)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&dish.name)
        .bind(&dish.image_url)
        .bind(&dish.description)
        .bind(dish.price)
        .bind(dish.category.as_str())
        .bind(dish.is_available)
        .fetch_one(&self.sqlx_db)
        .await
    }

    /// Replace every mutable column of an existing dish. Returns `None`
    /// when the id does not resolve.
    pub async fn update_dish(&self, id: i32, dish: &NewDish) -> Result<Option<Dish>> {
        sqlx::query_as::<_, Dish>(
            r#"
            UPDATE dish
            SET name = $1,
                image_url = $2,
                description = $3,
                price = $4,
                category = $5,
                is_available = $6,
                updated_at = now()
            WHERE id = $7
            RETURNING *
            "#,
        )
        .bind(&dish.name)
        .bind(&dish.image_url)
        .bind(&dish.description)
        .bind(dish.price)
        .bind(dish.category.as_str())
        .bind(dish.is_available)
        .bind(id)
        .fetch_optional(&self.sqlx_db)
        .await
    }

    /// Delete a dish by ID, reporting whether a row was actually removed
    pub async fn delete_dish(&self, id: i32) -> Result<bool> {
        let result = sqlx::query("DELETE FROM dish WHERE id = $1")
            .bind(id)
            .execute(&self.sqlx_db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// All reservations, soonest first; equal dates order by status text.
    pub async fn list_reservations(&self) -> Result<Vec<Reservation>> {
        sqlx::query_as::<_, Reservation>("SELECT * FROM reservation ORDER BY date, status")
            .fetch_all(&self.sqlx_db)
            .await
    }

    /// Create a new reservation from an already-validated record
    pub async fn create_reservation(&self, reservation: &NewReservation) -> Result<Reservation> {
        sqlx::query_as::<_, Reservation>(
            r#"
            INSERT INTO reservation (guest_name, email, number_of_guests, date, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&reservation.guest_name)
        .bind(&reservation.email)
        .bind(reservation.number_of_guests)
        .bind(reservation.date)
        .bind(reservation.status.as_str())
        .fetch_one(&self.sqlx_db)
        .await
    }

    /// Move a reservation to a new status. Returns `None` when the id does
    /// not resolve.
    pub async fn update_reservation_status(
        &self,
        id: i32,
        status: ReservationStatus,
    ) -> Result<Option<Reservation>> {
        sqlx::query_as::<_, Reservation>(
            r#"
            UPDATE reservation
            SET status = $1, updated_at = now()
            WHERE id = $2
            RETURNING *
            "#,
        )
        .bind(status.as_str())
        .bind(id)
        .fetch_optional(&self.sqlx_db)
        .await
    }

    /// Delete a reservation by ID, reporting whether a row was removed
    pub async fn delete_reservation(&self, id: i32) -> Result<bool> {
        let result = sqlx::query("DELETE FROM reservation WHERE id = $1")
            .bind(id)
            .execute(&self.sqlx_db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::error::{DatabaseError, ErrorKind};
    use std::borrow::Cow;
    use std::fmt;

    #[derive(Debug)]
    struct StubDbError(&'static str);

    impl fmt::Display for StubDbError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "constraint violation ({})", self.0)
        }
    }

    impl std::error::Error for StubDbError {}

    impl DatabaseError for StubDbError {
        fn message(&self) -> &str {
            "constraint violation"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            Some(Cow::Borrowed(self.0))
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            match self.0 {
                "23505" => ErrorKind::UniqueViolation,
                _ => ErrorKind::Other,
            }
        }
    }

    #[test]
    fn unique_violations_are_recognized_by_code() {
        let err = sqlx::Error::Database(Box::new(StubDbError("23505")));
        assert!(is_unique_violation(&err));
    }

    #[test]
    fn other_constraint_codes_are_not_unique_violations() {
        let err = sqlx::Error::Database(Box::new(StubDbError("23503")));
        assert!(!is_unique_violation(&err));
    }

    #[test]
    fn non_database_errors_are_not_unique_violations() {
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
    }
}
