//! Seeds a development database with a working dataset: two operator
//! accounts, two client companies, one dining hall and a handful of
//! workers. Idempotent - existing rows are left alone, so it is safe to
//! run against a database that already has data.
//!
//! ```text
//! DATABASE_PATH=./data/foodpass.db cargo run --bin seed
//! ```

use chrono::Utc;

use foodpass_core::{Company, DiningHall, Money, RateTable, User, UserRole, Worker};
use foodpass_db::{Database, DbConfig, DbResult};

#[tokio::main]
async fn main() -> DbResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let path = std::env::var("DATABASE_PATH").unwrap_or_else(|_| "./data/foodpass.db".to_string());
    tracing::info!(path = %path, "Seeding database");

    let db = Database::new(DbConfig::new(path)).await?;
    seed(&db).await?;

    tracing::info!("Seed complete");
    db.close().await;
    Ok(())
}

async fn seed(db: &Database) -> DbResult<()> {
    let now = Utc::now();
    let users = db.users();
    let workers = db.workers();
    let halls = db.dining_halls();

    for user in [
        User {
            id: "user-admin".to_string(),
            email: "admin@foodpass.cl".to_string(),
            name: "Administrador".to_string(),
            role: UserRole::Admin,
            is_active: true,
        },
        User {
            id: "user-operator".to_string(),
            email: "operador@foodpass.cl".to_string(),
            name: "Operador Comedor".to_string(),
            role: UserRole::Operator,
            is_active: true,
        },
    ] {
        if users.get_by_email(&user.email).await?.is_none() {
            users.insert(&user).await?;
            tracing::info!(email = %user.email, "User created");
        }
    }

    let companies = [
        Company {
            id: "company-a".to_string(),
            name: "Empresa Constructora A".to_string(),
            rut: "76123456-7".to_string(),
            contact_email: "contacto@constructora-a.cl".to_string(),
            rates: RateTable {
                breakfast: Money::from_pesos(3500),
                lunch: Money::from_pesos(4500),
                dinner: Money::from_pesos(4000),
                snack: Money::from_pesos(2000),
                enhanced: Money::from_pesos(5500),
            },
            is_active: true,
            created_at: now,
        },
        Company {
            id: "company-b".to_string(),
            name: "Minera del Norte B".to_string(),
            rut: "77987654-3".to_string(),
            contact_email: "facturacion@minera-b.cl".to_string(),
            rates: RateTable {
                breakfast: Money::from_pesos(3000),
                lunch: Money::from_pesos(4200),
                dinner: Money::from_pesos(3800),
                snack: Money::from_pesos(1800),
                enhanced: Money::from_pesos(5000),
            },
            is_active: true,
            created_at: now,
        },
    ];

    for company in &companies {
        // The rut column is UNIQUE; an existing company means this seed ran
        // before, so probe through a worker lookup-free path: insert and
        // tolerate the duplicate.
        match workers.insert_company(company).await {
            Ok(()) => tracing::info!(name = %company.name, "Company created"),
            Err(e) if e.is_unique_violation() => {
                tracing::debug!(name = %company.name, "Company already present")
            }
            Err(e) => return Err(e),
        }
    }

    let hall = DiningHall {
        id: "hall-central".to_string(),
        name: "Comedor Principal Central".to_string(),
        location: "Edificio Central, Piso 1".to_string(),
        capacity: 200,
        is_active: true,
    };
    if halls.get_by_id(&hall.id).await?.is_none() {
        halls.insert(&hall).await?;
        tracing::info!(name = %hall.name, "Dining hall created");
    }

    let seed_workers = [
        ("Juan Pérez", "12345678-9", "company-a", "Construcción"),
        ("María González", "9876543-2", "company-a", "Administración"),
        ("Pedro Soto", "15678234-5", "company-b", "Operaciones"),
        ("Ana Muñoz", "18432765-K", "company-b", "Prevención"),
    ];

    for (name, rut, company_id, department) in seed_workers {
        if workers.get_by_national_id(rut).await?.is_some() {
            continue;
        }
        let worker = Worker {
            id: format!("worker-{}", rut.to_lowercase().replace('-', "")),
            name: name.to_string(),
            rut: rut.to_string(),
            scan_code: format!("FP-{rut}"),
            company_id: company_id.to_string(),
            department: department.to_string(),
            is_active: true,
            created_at: now,
        };
        workers.insert(&worker).await?;
        tracing::info!(name = %worker.name, rut = %worker.rut, "Worker created");
    }

    Ok(())
}
