use pizzaria_api::{
    config::AppConfig,
    db::{DbPool, create_pool, run_migrations},
    models::Role,
    services::auth_service::hash_password,
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    run_migrations(&pool).await?;

    let admin_id = ensure_account(
        &pool,
        "Admin",
        "admin@pizzaria.local",
        "admin123",
        &[Role::Customer, Role::Admin],
    )
    .await?;
    let employee_id = ensure_account(
        &pool,
        "Cozinha",
        "cozinha@pizzaria.local",
        "cozinha123",
        &[Role::Customer, Role::Employee],
    )
    .await?;
    let customer_id = ensure_account(
        &pool,
        "Cliente Demo",
        "cliente@pizzaria.local",
        "cliente123",
        &[Role::Customer],
    )
    .await?;
    seed_menu(&pool).await?;

    println!(
        "Seed completed. Admin ID: {admin_id}, Employee ID: {employee_id}, Customer ID: {customer_id}"
    );
    Ok(())
}

async fn ensure_account(
    pool: &DbPool,
    name: &str,
    email: &str,
    password: &str,
    roles: &[Role],
) -> anyhow::Result<Uuid> {
    let password_hash = hash_password(password)?;

    let (user_id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, password_hash)
        VALUES ($1, $2, $3)
        ON CONFLICT (email) DO UPDATE SET email = EXCLUDED.email
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(password_hash)
    .fetch_one(pool)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO profiles (id, name, email, phone)
        VALUES ($1, $2, $3, '11999990000')
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(name)
    .bind(email)
    .execute(pool)
    .await?;

    for role in roles {
        sqlx::query(
            r#"
            INSERT INTO user_roles (id, user_id, role)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, role) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(role.as_str())
        .execute(pool)
        .await?;
    }

    let roles: Vec<&str> = roles.iter().map(|role| role.as_str()).collect();
    println!("Ensured account {email} (roles={})", roles.join(","));
    Ok(user_id)
}

async fn seed_menu(pool: &DbPool) -> anyhow::Result<()> {
    // name, description, category, small, medium, large, giant
    let pizzas = [
        ("Margherita", "Molho de tomate, mussarela, tomate e manjericão", "traditional", 3490, 4490, 5490, 6490),
        ("Calabresa", "Calabresa fatiada, cebola e azeitonas", "traditional", 3290, 4290, 5290, 6290),
        ("Quatro Queijos", "Mussarela, provolone, parmesão e gorgonzola", "special", 3990, 4990, 5990, 6990),
        ("Frango com Catupiry", "Frango desfiado e catupiry original", "special", 3790, 4790, 5790, 6790),
        ("Chocolate com Morango", "Chocolate ao leite e morangos frescos", "sweet", 3690, 4690, 5690, 6690),
    ];
    for (name, description, category, small, medium, large, giant) in pizzas {
        sqlx::query(
            r#"
            INSERT INTO menu_items
                (id, kind, name, description, category, price_small, price_medium, price_large, price_giant)
            VALUES ($1, 'pizza', $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(description)
        .bind(category)
        .bind(small as i64)
        .bind(medium as i64)
        .bind(large as i64)
        .bind(giant as i64)
        .execute(pool)
        .await?;
    }

    let beverages = [
        ("Coca-Cola", "Refrigerante", "2L", 1290),
        ("Guaraná Antarctica", "Refrigerante", "2L", 1090),
        ("Suco de Laranja", "Natural", "500ml", 990),
    ];
    for (name, description, volume, price) in beverages {
        sqlx::query(
            r#"
            INSERT INTO menu_items (id, kind, name, description, volume, price)
            VALUES ($1, 'beverage', $2, $3, $4, $5)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(description)
        .bind(volume)
        .bind(price as i64)
        .execute(pool)
        .await?;
    }

    let desserts = [
        ("Petit Gâteau", "Com sorvete de creme", 1890),
        ("Pudim", "Pudim de leite condensado", 1290),
    ];
    for (name, description, price) in desserts {
        sqlx::query(
            r#"
            INSERT INTO menu_items (id, kind, name, description, price)
            VALUES ($1, 'dessert', $2, $3, $4)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(description)
        .bind(price as i64)
        .execute(pool)
        .await?;
    }

    let extras = [
        ("crust", "Catupiry", 800),
        ("crust", "Cheddar", 800),
        ("crust", "Chocolate", 1000),
        ("add_on", "Bacon", 600),
        ("add_on", "Azeitona", 300),
        ("add_on", "Cebola Caramelizada", 400),
    ];
    for (kind, name, price) in extras {
        sqlx::query(
            r#"
            INSERT INTO extras (id, kind, name, price)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (kind, name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(kind)
        .bind(name)
        .bind(price as i64)
        .execute(pool)
        .await?;
    }

    println!("Seeded menu");
    Ok(())
}
