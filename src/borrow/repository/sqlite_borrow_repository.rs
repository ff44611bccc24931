use std::collections::HashMap;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Sqlite, SqliteConnection};
use tracing::warn;
use crate::borrow::domain::model::{BorrowDetailEntity, BorrowListingEntity, BorrowSlipEntity, PenaltyEntity};
use crate::borrow::repository::BorrowRepository;
use crate::core::library::{LibraryError, LibraryResult, PaginatedResult, SlipStatus};
use crate::core::repository::Repository;
use crate::utils::sqlite::{build_filter, from_rows, to_limit, to_offset, Database};

const SLIP_SELECT: &str = "SELECT slip_id, reader_id, staff_id, borrow_date, return_due, return_date, status FROM borrow_slips";

const DETAIL_SELECT: &str = "SELECT detail_id, slip_id, book_id, quantity, fine_amount FROM borrow_details";

const SLIP_COLUMNS: [&str; 6] = ["reader_id", "staff_id", "borrow_date", "return_due", "return_date", "status"];

const LISTING_SELECT: &str = r#"
SELECT * FROM (
    SELECT s.slip_id, s.reader_id, r.full_name, d.book_id, b.title, d.quantity,
           s.borrow_date, s.return_due, s.return_date, s.status
    FROM borrow_slips s
    JOIN readers r ON r.reader_id = s.reader_id
    JOIN borrow_details d ON d.slip_id = s.slip_id
    JOIN books b ON b.book_id = d.book_id
) AS listing"#;

const LISTING_COLUMNS: [&str; 7] = ["reader_id", "full_name", "book_id", "title", "status", "borrow_date", "return_due"];

const PENALTY_SELECT: &str = "SELECT penalty_id, reader_id, slip_id, book_id, penalty_type, amount, created_at FROM penalties";

#[derive(Debug)]
pub struct SqliteBorrowRepository {
    db: Database,
}

impl SqliteBorrowRepository {
    pub fn new(db: Database) -> Self {
        Self {
            db,
        }
    }

    async fn load_slip(conn: &mut SqliteConnection, slip_id: i64) -> LibraryResult<BorrowSlipEntity> {
        let sql = format!("{} WHERE slip_id = ?", SLIP_SELECT);
        let mut slip = sqlx::query_as::<Sqlite, BorrowSlipEntity>(sql.as_str())
            .bind(slip_id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| LibraryError::not_found(format!("borrow slip {} not found", slip_id).as_str()))?;
        let sql = format!("{} WHERE slip_id = ? ORDER BY detail_id", DETAIL_SELECT);
        slip.details = sqlx::query_as::<Sqlite, BorrowDetailEntity>(sql.as_str())
            .bind(slip_id)
            .fetch_all(&mut *conn)
            .await?;
        Ok(slip)
    }

    async fn attach_details(&self, slips: &mut [BorrowSlipEntity]) -> LibraryResult<()> {
        if slips.is_empty() {
            return Ok(());
        }
        let placeholders = slips.iter().map(|_| "?").collect::<Vec<&str>>().join(", ");
        let sql = format!("{} WHERE slip_id IN ({}) ORDER BY detail_id", DETAIL_SELECT, placeholders);
        let mut query = sqlx::query_as::<Sqlite, BorrowDetailEntity>(sql.as_str());
        for slip in slips.iter() {
            query = query.bind(slip.slip_id);
        }
        let details = query.fetch_all(self.db.pool()).await?;
        for slip in slips.iter_mut() {
            slip.details = details.iter().filter(|d| d.slip_id == slip.slip_id).cloned().collect();
        }
        Ok(())
    }
}

#[async_trait]
impl Repository<BorrowSlipEntity> for SqliteBorrowRepository {
    async fn create(&self, entity: &BorrowSlipEntity) -> LibraryResult<i64> {
        let mut tx = self.db.pool().begin().await?;
        let slip_id = sqlx::query(
            "INSERT INTO borrow_slips (reader_id, staff_id, borrow_date, return_due, return_date, status) \
             VALUES (?, ?, ?, ?, ?, ?)")
            .bind(entity.reader_id)
            .bind(entity.staff_id)
            .bind(entity.borrow_date)
            .bind(entity.return_due)
            .bind(entity.return_date)
            .bind(entity.status.to_string())
            .execute(&mut *tx)
            .await?
            .last_insert_rowid();

        for detail in &entity.details {
            sqlx::query("INSERT INTO borrow_details (slip_id, book_id, quantity, fine_amount) VALUES (?, ?, ?, ?)")
                .bind(slip_id)
                .bind(detail.book_id)
                .bind(detail.quantity)
                .bind(detail.fine_amount)
                .execute(&mut *tx)
                .await?;
            let reserved = sqlx::query(
                "UPDATE book_inventory SET available_quantity = available_quantity - ? \
                 WHERE book_id = ? AND available_quantity >= ?")
                .bind(detail.quantity)
                .bind(detail.book_id)
                .bind(detail.quantity)
                .execute(&mut *tx)
                .await?
                .rows_affected();
            if reserved == 0 {
                tx.rollback().await?;
                warn!("rolled back borrow of book {} for reader {}", detail.book_id, entity.reader_id);
                return Err(LibraryError::insufficient_stock(
                    format!("book {} has fewer than {} copies available", detail.book_id, detail.quantity).as_str()));
            }
        }
        tx.commit().await?;
        Ok(slip_id)
    }

    async fn update(&self, entity: &BorrowSlipEntity) -> LibraryResult<usize> {
        let res = sqlx::query("UPDATE borrow_slips SET borrow_date = ?, return_date = ?, status = ? WHERE slip_id = ?")
            .bind(entity.borrow_date)
            .bind(entity.return_date)
            .bind(entity.status.to_string())
            .bind(entity.slip_id)
            .execute(self.db.pool())
            .await?;
        Ok(res.rows_affected() as usize)
    }

    async fn get(&self, id: i64) -> LibraryResult<BorrowSlipEntity> {
        let mut conn = self.db.pool().acquire().await?;
        Self::load_slip(&mut *conn, id).await
    }

    async fn delete(&self, id: i64) -> LibraryResult<usize> {
        let res = sqlx::query("DELETE FROM borrow_slips WHERE slip_id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(res.rows_affected() as usize)
    }

    async fn query(&self, predicate: &HashMap<String, String>,
                   page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<BorrowSlipEntity>> {
        let (filter_expr, values) = build_filter(predicate, &SLIP_COLUMNS)?;
        let offset = to_offset(page)?;
        let sql = format!("{}{} ORDER BY slip_id DESC LIMIT ? OFFSET ?", SLIP_SELECT, filter_expr);
        let mut query = sqlx::query_as::<Sqlite, BorrowSlipEntity>(sql.as_str());
        for value in values {
            query = query.bind(value);
        }
        let mut records = query
            .bind(to_limit(page_size))
            .bind(offset)
            .fetch_all(self.db.pool())
            .await?;
        self.attach_details(&mut records).await?;
        Ok(from_rows(page, page_size, offset, records))
    }
}

#[async_trait]
impl BorrowRepository for SqliteBorrowRepository {
    async fn return_slip(&self, slip_id: i64, today: NaiveDate) -> LibraryResult<BorrowSlipEntity> {
        let mut tx = self.db.pool().begin().await?;
        let mut slip = Self::load_slip(&mut *tx, slip_id).await?;
        let closed = sqlx::query(
            "UPDATE borrow_slips SET status = 'RETURNED', return_date = ? \
             WHERE slip_id = ? AND status IN ('BORROWING', 'LATE')")
            .bind(today)
            .bind(slip_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if closed == 0 {
            tx.rollback().await?;
            return Err(LibraryError::conflict(
                format!("borrow slip {} is already {} and cannot be returned", slip_id, slip.status).as_str()));
        }

        for detail in &slip.details {
            let credited = sqlx::query(
                "UPDATE book_inventory SET available_quantity = available_quantity + ? \
                 WHERE book_id = ? AND available_quantity + ? <= total_quantity")
                .bind(detail.quantity)
                .bind(detail.book_id)
                .bind(detail.quantity)
                .execute(&mut *tx)
                .await?
                .rows_affected();
            if credited == 0 {
                tx.rollback().await?;
                warn!("rolled back return of slip {}, book {} cannot take {} copies back",
                    slip_id, detail.book_id, detail.quantity);
                return Err(LibraryError::conflict(
                    format!("returning {} copies of book {} would exceed its total quantity",
                            detail.quantity, detail.book_id).as_str()));
            }
        }
        tx.commit().await?;
        slip.status = SlipStatus::Returned;
        slip.return_date = Some(today);
        Ok(slip)
    }

    async fn list_borrows(&self, predicate: &HashMap<String, String>,
                          page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<BorrowListingEntity>> {
        let (filter_expr, values) = build_filter(predicate, &LISTING_COLUMNS)?;
        let offset = to_offset(page)?;
        let sql = format!("{}{} ORDER BY borrow_date DESC, slip_id DESC LIMIT ? OFFSET ?", LISTING_SELECT, filter_expr);
        let mut query = sqlx::query_as::<Sqlite, BorrowListingEntity>(sql.as_str());
        for value in values {
            query = query.bind(value);
        }
        let records = query
            .bind(to_limit(page_size))
            .bind(offset)
            .fetch_all(self.db.pool())
            .await?;
        Ok(from_rows(page, page_size, offset, records))
    }

    async fn mark_overdue(&self, today: NaiveDate) -> LibraryResult<usize> {
        let res = sqlx::query("UPDATE borrow_slips SET status = 'LATE' WHERE status = 'BORROWING' AND return_due < ?")
            .bind(today)
            .execute(self.db.pool())
            .await?;
        Ok(res.rows_affected() as usize)
    }

    async fn record_penalty(&self, penalty: &PenaltyEntity) -> LibraryResult<i64> {
        let mut tx = self.db.pool().begin().await?;
        let fined = sqlx::query(
            "UPDATE borrow_details SET fine_amount = fine_amount + ? \
             WHERE slip_id = ? AND book_id = ? \
             AND slip_id IN (SELECT slip_id FROM borrow_slips WHERE reader_id = ?)")
            .bind(penalty.amount)
            .bind(penalty.slip_id)
            .bind(penalty.book_id)
            .bind(penalty.reader_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if fined == 0 {
            tx.rollback().await?;
            return Err(LibraryError::not_found(
                format!("no borrow of book {} on slip {} for reader {}",
                        penalty.book_id, penalty.slip_id, penalty.reader_id).as_str()));
        }
        let penalty_id = sqlx::query(
            "INSERT INTO penalties (reader_id, slip_id, book_id, penalty_type, amount, created_at) \
             VALUES (?, ?, ?, ?, ?, datetime('now'))")
            .bind(penalty.reader_id)
            .bind(penalty.slip_id)
            .bind(penalty.book_id)
            .bind(penalty.penalty_type.to_string())
            .bind(penalty.amount)
            .execute(&mut *tx)
            .await?
            .last_insert_rowid();
        tx.commit().await?;
        Ok(penalty_id)
    }

    async fn find_penalties_by_reader(&self, reader_id: i64) -> LibraryResult<Vec<PenaltyEntity>> {
        let sql = format!("{} WHERE reader_id = ? ORDER BY penalty_id DESC", PENALTY_SELECT);
        let penalties = sqlx::query_as::<Sqlite, PenaltyEntity>(sql.as_str())
            .bind(reader_id)
            .fetch_all(self.db.pool())
            .await?;
        Ok(penalties)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use crate::borrow::domain::model::{BorrowSlipEntity, PenaltyEntity};
    use crate::borrow::repository::BorrowRepository;
    use crate::borrow::repository::sqlite_borrow_repository::SqliteBorrowRepository;
    use crate::core::library::{LibraryError, PenaltyKind, SlipStatus};
    use crate::core::repository::Repository;
    use crate::utils::testing::{available_quantity, count_rows, day, seed_book, seed_reader, test_db};

    fn new_slip(reader_id: i64, book_id: i64, quantity: i64, borrow_date: &str) -> BorrowSlipEntity {
        let mut slip = BorrowSlipEntity::new(reader_id, 1, day(borrow_date), 14).expect("should build slip");
        slip.add_detail(book_id, quantity);
        slip
    }

    #[tokio::test]
    async fn test_should_create_get_slip() {
        let db = test_db().await;
        let borrow_repo = SqliteBorrowRepository::new(db.clone());
        let reader_id = seed_reader(&db, "Ana Lima", "ACTIVE", "2026-01-01").await;
        let book_id = seed_book(&db, "Dune", 5, 3).await;

        let slip_id = borrow_repo.create(&new_slip(reader_id, book_id, 2, "2025-01-01")).await.expect("should create slip");
        assert_eq!(1, available_quantity(&db, book_id).await);

        let slip = borrow_repo.get(slip_id).await.expect("should return slip");
        assert_eq!(day("2025-01-15"), slip.return_due);
        assert_eq!(SlipStatus::Borrowing, slip.status);
        assert_eq!(1, slip.details.len());
        assert_eq!(2, slip.details[0].quantity);
        assert!(matches!(borrow_repo.get(404).await, Err(LibraryError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_should_roll_back_slip_without_stock() {
        let db = test_db().await;
        let borrow_repo = SqliteBorrowRepository::new(db.clone());
        let reader_id = seed_reader(&db, "Ana Lima", "ACTIVE", "2026-01-01").await;
        let book_id = seed_book(&db, "Dune", 2, 1).await;

        let res = borrow_repo.create(&new_slip(reader_id, book_id, 2, "2025-01-01")).await;
        assert!(matches!(res, Err(LibraryError::InsufficientStock { .. })));
        assert_eq!(0, count_rows(&db, "borrow_slips").await);
        assert_eq!(0, count_rows(&db, "borrow_details").await);
        assert_eq!(1, available_quantity(&db, book_id).await);
    }

    #[tokio::test]
    async fn test_should_return_slip_once() {
        let db = test_db().await;
        let borrow_repo = SqliteBorrowRepository::new(db.clone());
        let reader_id = seed_reader(&db, "Ana Lima", "ACTIVE", "2026-01-01").await;
        let book_id = seed_book(&db, "Dune", 4, 4).await;
        let slip_id = borrow_repo.create(&new_slip(reader_id, book_id, 2, "2025-01-01")).await.expect("should create slip");
        assert_eq!(2, available_quantity(&db, book_id).await);

        let slip = borrow_repo.return_slip(slip_id, day("2025-01-10")).await.expect("should return slip");
        assert_eq!(SlipStatus::Returned, slip.status);
        assert_eq!(Some(day("2025-01-10")), slip.return_date);
        assert_eq!(4, available_quantity(&db, book_id).await);

        assert!(matches!(borrow_repo.return_slip(slip_id, day("2025-01-11")).await, Err(LibraryError::Conflict { .. })));
        assert_eq!(4, available_quantity(&db, book_id).await);
        assert!(matches!(borrow_repo.return_slip(404, day("2025-01-11")).await, Err(LibraryError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_should_roll_back_return_over_total() {
        let db = test_db().await;
        let borrow_repo = SqliteBorrowRepository::new(db.clone());
        let reader_id = seed_reader(&db, "Ana Lima", "ACTIVE", "2026-01-01").await;
        let book_id = seed_book(&db, "Dune", 3, 3).await;
        let slip_id = borrow_repo.create(&new_slip(reader_id, book_id, 1, "2025-01-01")).await.expect("should create slip");
        // inventory corrected by hand while the copy was out
        sqlx::query("UPDATE book_inventory SET available_quantity = 3 WHERE book_id = ?")
            .bind(book_id).execute(db.pool()).await.expect("should reset inventory");

        assert!(matches!(borrow_repo.return_slip(slip_id, day("2025-01-05")).await, Err(LibraryError::Conflict { .. })));
        assert_eq!(SlipStatus::Borrowing, borrow_repo.get(slip_id).await.expect("should load").status);
        assert_eq!(3, available_quantity(&db, book_id).await);
    }

    #[tokio::test]
    async fn test_should_update_slip_without_stock_change() {
        let db = test_db().await;
        let borrow_repo = SqliteBorrowRepository::new(db.clone());
        let reader_id = seed_reader(&db, "Ana Lima", "ACTIVE", "2026-01-01").await;
        let book_id = seed_book(&db, "Dune", 2, 2).await;
        let slip_id = borrow_repo.create(&new_slip(reader_id, book_id, 1, "2025-01-01")).await.expect("should create slip");

        let mut slip = borrow_repo.get(slip_id).await.expect("should load");
        slip.status = SlipStatus::Lost;
        slip.borrow_date = day("2024-12-30");
        assert_eq!(1, borrow_repo.update(&slip).await.expect("should update"));
        let loaded = borrow_repo.get(slip_id).await.expect("should load");
        assert_eq!(SlipStatus::Lost, loaded.status);
        assert_eq!(day("2024-12-30"), loaded.borrow_date);
        assert_eq!(1, available_quantity(&db, book_id).await);

        slip.slip_id = 404;
        assert_eq!(0, borrow_repo.update(&slip).await.expect("should update nothing"));
    }

    #[tokio::test]
    async fn test_should_query_and_list_borrows() {
        let db = test_db().await;
        let borrow_repo = SqliteBorrowRepository::new(db.clone());
        let ana = seed_reader(&db, "Ana Lima", "ACTIVE", "2026-01-01").await;
        let bruno = seed_reader(&db, "Bruno Costa", "ACTIVE", "2026-01-01").await;
        let dune = seed_book(&db, "Dune", 5, 5).await;
        let emma = seed_book(&db, "Emma", 5, 5).await;
        let _ = borrow_repo.create(&new_slip(ana, dune, 1, "2025-01-01")).await.expect("should create slip");
        let _ = borrow_repo.create(&new_slip(bruno, emma, 2, "2025-01-03")).await.expect("should create slip");
        let _ = borrow_repo.create(&new_slip(ana, emma, 1, "2025-01-05")).await.expect("should create slip");

        let res = borrow_repo.query(&HashMap::from([("reader_id".to_string(), ana.to_string())]), None, 10)
            .await.expect("should query");
        assert_eq!(2, res.records.len());
        assert_eq!(emma, res.records[0].details[0].book_id);
        assert_eq!(dune, res.records[1].details[0].book_id);

        let res = borrow_repo.list_borrows(&HashMap::new(), None, 10).await.expect("should list");
        assert_eq!(3, res.records.len());
        assert_eq!(day("2025-01-05"), res.records[0].borrow_date);
        assert_eq!("Ana Lima", res.records[0].full_name);
        assert_eq!("Emma", res.records[0].title);

        let res = borrow_repo.list_borrows(&HashMap::from([("title".to_string(), "Emma".to_string())]), None, 1)
            .await.expect("should list");
        assert_eq!(1, res.records.len());
        assert_eq!(Some("1".to_string()), res.next_page);
        assert!(borrow_repo.list_borrows(&HashMap::from([("fine_amount".to_string(), "0".to_string())]), None, 10)
            .await.is_err());
    }

    #[tokio::test]
    async fn test_should_mark_overdue_once() {
        let db = test_db().await;
        let borrow_repo = SqliteBorrowRepository::new(db.clone());
        let reader_id = seed_reader(&db, "Ana Lima", "ACTIVE", "2026-01-01").await;
        let book_id = seed_book(&db, "Dune", 5, 5).await;
        let late = borrow_repo.create(&new_slip(reader_id, book_id, 1, "2025-01-01")).await.expect("should create slip");
        let due_today = borrow_repo.create(&new_slip(reader_id, book_id, 1, "2025-01-06")).await.expect("should create slip");

        assert_eq!(1, borrow_repo.mark_overdue(day("2025-01-20")).await.expect("should mark overdue"));
        assert_eq!(0, borrow_repo.mark_overdue(day("2025-01-20")).await.expect("should mark nothing"));
        assert_eq!(SlipStatus::Late, borrow_repo.get(late).await.expect("should load").status);
        assert_eq!(SlipStatus::Borrowing, borrow_repo.get(due_today).await.expect("should load").status);

        // a late slip can still be returned
        let slip = borrow_repo.return_slip(late, day("2025-01-21")).await.expect("should return late slip");
        assert_eq!(SlipStatus::Returned, slip.status);
    }

    #[tokio::test]
    async fn test_should_record_penalties() {
        let db = test_db().await;
        let borrow_repo = SqliteBorrowRepository::new(db.clone());
        let reader_id = seed_reader(&db, "Ana Lima", "ACTIVE", "2026-01-01").await;
        let other_id = seed_reader(&db, "Bruno Costa", "ACTIVE", "2026-01-01").await;
        let book_id = seed_book(&db, "Dune", 5, 5).await;
        let slip_id = borrow_repo.create(&new_slip(reader_id, book_id, 1, "2025-01-01")).await.expect("should create slip");

        let penalty = PenaltyEntity {
            penalty_id: 0,
            reader_id,
            slip_id,
            book_id,
            penalty_type: PenaltyKind::Late,
            amount: 2.5,
            created_at: None,
        };
        let _ = borrow_repo.record_penalty(&penalty).await.expect("should record penalty");
        let _ = borrow_repo.record_penalty(&penalty).await.expect("should record penalty");
        let slip = borrow_repo.get(slip_id).await.expect("should load slip");
        assert_eq!(5.0, slip.details[0].fine_amount);

        let penalties = borrow_repo.find_penalties_by_reader(reader_id).await.expect("should load penalties");
        assert_eq!(2, penalties.len());
        assert_eq!(PenaltyKind::Late, penalties[0].penalty_type);
        assert!(penalties[0].created_at.is_some());

        let mut foreign = penalty.clone();
        foreign.reader_id = other_id;
        assert!(matches!(borrow_repo.record_penalty(&foreign).await, Err(LibraryError::NotFound { .. })));
        assert_eq!(2, count_rows(&db, "penalties").await);
    }
}
