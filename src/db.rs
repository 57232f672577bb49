use anyhow::Context;
use chrono::NaiveDate;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::{ParticipantMetric, TaskStatus, TaskSubmission};

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let participants = vec![
        (
            Uuid::parse_str("6f1c2a9e-3b44-4d1f-9a57-1d2e8c0f4a01")?,
            "Alex Johnson",
            "alex.johnson@example.com",
            "Summer 2023",
            520.0,
            7i64,
            95.0,
            100.0,
        ),
        (
            Uuid::parse_str("b2d4e6f8-1a3c-4e5d-8b7a-9c0d1e2f3a02")?,
            "Samantha Lee",
            "samantha.lee@example.com",
            "Spring 2023",
            600.0,
            9,
            100.0,
            90.0,
        ),
        (
            Uuid::parse_str("c3e5f7a9-2b4d-4f6e-9c8b-0d1e2f3a4b03")?,
            "Sophia Chen",
            "sophia.chen@example.com",
            "Spring 2023",
            1200.0,
            18,
            98.0,
            100.0,
        ),
        (
            Uuid::parse_str("d4f6a8b0-3c5e-4a7f-8d9c-1e2f3a4b5c04")?,
            "James Wilson",
            "james.wilson@example.com",
            "Summer 2023",
            150.0,
            3,
            75.0,
            80.0,
        ),
    ];

    for (id, name, email, batch, sales, customers, completion, attendance) in participants {
        sqlx::query(
            r#"
            INSERT INTO batch_performance.participants
            (id, full_name, email, batch, sales_amount, customer_count,
             task_completion_pct, attendance_pct)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (email) DO UPDATE
            SET full_name = EXCLUDED.full_name,
                batch = EXCLUDED.batch,
                sales_amount = EXCLUDED.sales_amount,
                customer_count = EXCLUDED.customer_count,
                task_completion_pct = EXCLUDED.task_completion_pct,
                attendance_pct = EXCLUDED.attendance_pct
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .bind(batch)
        .bind(sales)
        .bind(customers)
        .bind(completion)
        .bind(attendance)
        .execute(pool)
        .await?;
    }

    let tasks = vec![
        (
            "seed-task-001",
            "alex.johnson@example.com",
            "Create a Business Plan",
            "Draft a comprehensive business plan for your product idea.",
            NaiveDate::from_ymd_opt(2023, 9, 30).context("invalid date")?,
        ),
        (
            "seed-task-002",
            "alex.johnson@example.com",
            "Design Product Packaging",
            "Create eco-friendly packaging designs for your product.",
            NaiveDate::from_ymd_opt(2023, 10, 10).context("invalid date")?,
        ),
        (
            "seed-task-003",
            "samantha.lee@example.com",
            "Marketing Strategy",
            "Develop a marketing strategy to promote your product.",
            NaiveDate::from_ymd_opt(2023, 10, 15).context("invalid date")?,
        ),
        (
            "seed-task-004",
            "james.wilson@example.com",
            "Customer Feedback Analysis",
            "Collect and analyze feedback from at least 10 potential customers.",
            NaiveDate::from_ymd_opt(2023, 10, 5).context("invalid date")?,
        ),
    ];

    for (source_key, email, title, description, deadline) in tasks {
        let participant_id: Uuid = sqlx::query(
            "SELECT id FROM batch_performance.participants WHERE email = $1",
        )
        .bind(email)
        .fetch_one(pool)
        .await?
        .get("id");

        sqlx::query(
            r#"
            INSERT INTO batch_performance.tasks
            (id, participant_id, title, description, status, deadline, source_key)
            VALUES ($1, $2, $3, $4, 'pending', $5, $6)
            ON CONFLICT (source_key) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(participant_id)
        .bind(title)
        .bind(description)
        .bind(deadline)
        .bind(source_key)
        .execute(pool)
        .await?;
    }

    Ok(())
}

/// Fetch every participant's metrics. Scope filtering happens in the
/// ranking engine, not in SQL, so batch and national boards share one query.
pub async fn fetch_metrics(pool: &PgPool) -> anyhow::Result<Vec<ParticipantMetric>> {
    let records = sqlx::query(
        "SELECT id, full_name, email, batch, sales_amount, customer_count, \
         task_completion_pct, attendance_pct \
         FROM batch_performance.participants ORDER BY full_name",
    )
    .fetch_all(pool)
    .await?;
    let mut metrics = Vec::new();

    for row in records {
        metrics.push(ParticipantMetric {
            participant_id: row.get("id"),
            display_name: row.get("full_name"),
            email: row.get("email"),
            batch: row.get("batch"),
            sales_amount: row.get("sales_amount"),
            customer_count: row.get("customer_count"),
            task_completion_pct: row.get("task_completion_pct"),
            attendance_pct: row.get("attendance_pct"),
        });
    }

    Ok(metrics)
}

pub async fn fetch_tasks(
    pool: &PgPool,
    email: Option<&str>,
) -> anyhow::Result<Vec<TaskSubmission>> {
    let mut query = String::from(
        "SELECT t.id, t.participant_id, t.title, t.description, t.status, \
         t.deadline, t.submitted_at, t.attachment_ref, t.feedback, t.rating \
         FROM batch_performance.tasks t \
         JOIN batch_performance.participants p ON p.id = t.participant_id",
    );
    if email.is_some() {
        query.push_str(" WHERE p.email = $1");
    }
    query.push_str(" ORDER BY t.deadline");

    let mut rows = sqlx::query(&query);
    if let Some(value) = email {
        rows = rows.bind(value);
    }

    let records = rows.fetch_all(pool).await?;
    let mut tasks = Vec::new();
    for row in records {
        tasks.push(task_from_row(&row)?);
    }
    Ok(tasks)
}

pub async fn fetch_task(pool: &PgPool, task_id: Uuid) -> anyhow::Result<TaskSubmission> {
    let row = sqlx::query(
        "SELECT id, participant_id, title, description, status, deadline, \
         submitted_at, attachment_ref, feedback, rating \
         FROM batch_performance.tasks WHERE id = $1",
    )
    .bind(task_id)
    .fetch_one(pool)
    .await
    .with_context(|| format!("no task with id {task_id}"))?;

    task_from_row(&row)
}

pub async fn store_task(pool: &PgPool, task: &TaskSubmission) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        UPDATE batch_performance.tasks
        SET status = $2, submitted_at = $3, attachment_ref = $4,
            feedback = $5, rating = $6
        WHERE id = $1
        "#,
    )
    .bind(task.task_id)
    .bind(task.status.as_str())
    .bind(task.submitted_at)
    .bind(task.attachment_ref.as_deref())
    .bind(task.feedback.as_deref())
    .bind(task.rating)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn import_csv(pool: &PgPool, csv_path: &std::path::Path) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        full_name: String,
        email: String,
        batch: String,
        sales_amount: f64,
        customer_count: i64,
        task_completion_pct: f64,
        attendance_pct: f64,
    }

    let mut reader = csv::Reader::from_path(csv_path)?;
    let mut imported = 0usize;

    for result in reader.deserialize::<CsvRow>() {
        let row = result?;
        if row.sales_amount < 0.0 || row.customer_count < 0 {
            anyhow::bail!("negative metric for {}", row.email);
        }

        // Percentages are clamped here, at the entry boundary; the ranking
        // engine takes them as-is.
        sqlx::query(
            r#"
            INSERT INTO batch_performance.participants
            (id, full_name, email, batch, sales_amount, customer_count,
             task_completion_pct, attendance_pct)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (email) DO UPDATE
            SET full_name = EXCLUDED.full_name,
                batch = EXCLUDED.batch,
                sales_amount = EXCLUDED.sales_amount,
                customer_count = EXCLUDED.customer_count,
                task_completion_pct = EXCLUDED.task_completion_pct,
                attendance_pct = EXCLUDED.attendance_pct
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&row.full_name)
        .bind(&row.email)
        .bind(&row.batch)
        .bind(row.sales_amount)
        .bind(row.customer_count)
        .bind(row.task_completion_pct.clamp(0.0, 100.0))
        .bind(row.attendance_pct.clamp(0.0, 100.0))
        .execute(pool)
        .await?;

        imported += 1;
    }

    Ok(imported)
}

fn task_from_row(row: &sqlx::postgres::PgRow) -> anyhow::Result<TaskSubmission> {
    let status: String = row.get("status");
    Ok(TaskSubmission {
        task_id: row.get("id"),
        participant_id: row.get("participant_id"),
        title: row.get("title"),
        description: row.get("description"),
        status: status
            .parse::<TaskStatus>()
            .map_err(anyhow::Error::msg)?,
        deadline: row.get("deadline"),
        submitted_at: row.get("submitted_at"),
        attachment_ref: row.get("attachment_ref"),
        feedback: row.get("feedback"),
        rating: row.get("rating"),
    })
}
