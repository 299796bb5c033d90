//! Event log schema migrations, embedded at build time
//!
//! Each entry is (file name, SQL). They are applied in order and recorded
//! in `sys_migrations`; `000_migrations.sql` bootstraps that table.

pub const LOG_MIGRATIONS: &[(&str, &str)] = &[
    ("000_migrations.sql", include_str!("000_migrations.sql")),
    (
        "001_initial_schema.sql",
        include_str!("001_initial_schema.sql"),
    ),
];
