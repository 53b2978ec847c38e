use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_users_table::Migration),
            Box::new(m20250301_000002_create_products_table::Migration),
            Box::new(m20250301_000003_create_clients_table::Migration),
            Box::new(m20250301_000004_create_orders_table::Migration),
            Box::new(m20250301_000005_create_order_items_table::Migration),
            Box::new(m20250301_000006_create_project_templates_table::Migration),
            Box::new(m20250301_000007_create_projects_table::Migration),
        ]
    }
}

mod m20250301_000001_create_users_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000001_create_users_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Users::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Users::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Users::Name).string_len(255).not_null())
                        .col(
                            ColumnDef::new(Users::Email)
                                .string_len(255)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                        .col(
                            ColumnDef::new(Users::Role)
                                .string_len(20)
                                .not_null()
                                .default("salesperson")
                                .check(Expr::col(Users::Role).is_in([
                                    "admin",
                                    "salesperson",
                                    "designer",
                                ])),
                        )
                        .col(
                            ColumnDef::new(Users::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Users::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Users::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Users::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum Users {
        Table,
        Id,
        Name,
        Email,
        PasswordHash,
        Role,
        Active,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250301_000002_create_products_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000002_create_products_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Products::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Products::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(Products::Code)
                                .string_len(50)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Products::Name).string_len(255).not_null())
                        .col(ColumnDef::new(Products::Description).text().null())
                        .col(
                            ColumnDef::new(Products::CostPrice)
                                .decimal_len(12, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Products::SalePrice)
                                .decimal_len(12, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Products::ConventionPrice)
                                .decimal_len(12, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Products::Unit)
                                .string_len(10)
                                .not_null()
                                .default("PC"),
                        )
                        .col(ColumnDef::new(Products::ImageUrl).text().null())
                        .col(
                            ColumnDef::new(Products::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Products::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Products::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_products_name")
                        .table(Products::Table)
                        .col(Products::Name)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Products::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum Products {
        Table,
        Id,
        Code,
        Name,
        Description,
        CostPrice,
        SalePrice,
        ConventionPrice,
        Unit,
        ImageUrl,
        Active,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250301_000003_create_clients_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000003_create_clients_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Clients::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Clients::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Clients::Name).string_len(255).not_null())
                        .col(ColumnDef::new(Clients::TaxId).string_len(20).null())
                        .col(ColumnDef::new(Clients::Address).text().null())
                        .col(ColumnDef::new(Clients::Neighborhood).string_len(100).null())
                        .col(ColumnDef::new(Clients::City).string_len(100).null())
                        .col(ColumnDef::new(Clients::State).string_len(50).null())
                        .col(ColumnDef::new(Clients::Phone).string_len(30).null())
                        .col(ColumnDef::new(Clients::Email).string_len(255).null())
                        .col(
                            ColumnDef::new(Clients::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Clients::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Clients::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum Clients {
        Table,
        Id,
        Name,
        TaxId,
        Address,
        Neighborhood,
        City,
        State,
        Phone,
        Email,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250301_000004_create_orders_table {
    use super::m20250301_000003_create_clients_table::Clients;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000004_create_orders_table"
        }
    }

    /// Amounts entered on the proposal.
    fn money(column: Orders) -> ColumnDef {
        ColumnDef::new(column)
            .decimal_len(14, 2)
            .not_null()
            .default(0)
            .to_owned()
    }

    /// Amounts derived from the lines. Wide enough to hold them unrounded.
    fn computed_money(column: Orders) -> ColumnDef {
        ColumnDef::new(column)
            .decimal_len(28, 4)
            .not_null()
            .default(0)
            .to_owned()
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Orders::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Orders::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(Orders::Number)
                                .integer()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Orders::Date).date().not_null())
                        .col(ColumnDef::new(Orders::ClientId).uuid().null())
                        .col(&mut computed_money(Orders::Subtotal))
                        .col(&mut money(Orders::Freight))
                        .col(&mut money(Orders::TaxSubstitution))
                        .col(&mut computed_money(Orders::TotalDiscount))
                        .col(&mut computed_money(Orders::Total))
                        .col(
                            ColumnDef::new(Orders::ValidityDays)
                                .integer()
                                .not_null()
                                .default(7),
                        )
                        .col(
                            ColumnDef::new(Orders::PaymentCondition)
                                .string_len(100)
                                .not_null()
                                .default("A VISTA"),
                        )
                        .col(
                            ColumnDef::new(Orders::PaymentMethod)
                                .string_len(100)
                                .not_null()
                                .default("DEPOSITO"),
                        )
                        .col(ColumnDef::new(Orders::DeliveryDeadline).string_len(100).null())
                        .col(ColumnDef::new(Orders::Observations).text().null())
                        .col(ColumnDef::new(Orders::Seller).string_len(255).null())
                        .col(
                            ColumnDef::new(Orders::Status)
                                .string_len(20)
                                .not_null()
                                .default("draft")
                                .check(Expr::col(Orders::Status).is_in([
                                    "draft",
                                    "sent",
                                    "approved",
                                    "cancelled",
                                ])),
                        )
                        .col(
                            ColumnDef::new(Orders::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Orders::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_orders_client_id")
                                .from(Orders::Table, Orders::ClientId)
                                .to(Clients::Table, Clients::Id)
                                .on_delete(ForeignKeyAction::SetNull)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_client_id")
                        .table(Orders::Table)
                        .col(Orders::ClientId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_status")
                        .table(Orders::Table)
                        .col(Orders::Status)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Orders::Table).to_owned())
                .await
        }
    }

    #[derive(Iden, Clone, Copy)]
    pub enum Orders {
        Table,
        Id,
        Number,
        Date,
        ClientId,
        Subtotal,
        Freight,
        TaxSubstitution,
        TotalDiscount,
        Total,
        ValidityDays,
        PaymentCondition,
        PaymentMethod,
        DeliveryDeadline,
        Observations,
        Seller,
        Status,
        CreatedAt,
        UpdatedAt,
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn derived_amounts_are_stored_without_rounding() {
            let sql = Table::create()
                .table(Orders::Table)
                .col(&mut money(Orders::Freight))
                .col(&mut computed_money(Orders::Subtotal))
                .to_string(PostgresQueryBuilder);
            assert!(sql.contains(r#""freight" decimal(14, 2)"#), "{sql}");
            assert!(sql.contains(r#""subtotal" decimal(28, 4)"#), "{sql}");
        }
    }
}

mod m20250301_000005_create_order_items_table {
    use super::m20250301_000002_create_products_table::Products;
    use super::m20250301_000004_create_orders_table::Orders;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000005_create_order_items_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(OrderItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OrderItems::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OrderItems::OrderId).uuid().not_null())
                        .col(ColumnDef::new(OrderItems::ProductId).uuid().null())
                        .col(
                            ColumnDef::new(OrderItems::Position)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(OrderItems::Quantity)
                                .decimal_len(14, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OrderItems::UnitPrice)
                                .decimal_len(14, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OrderItems::Discount)
                                .decimal_len(14, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(OrderItems::Total)
                                .decimal_len(28, 4)
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_items_order_id")
                                .from(OrderItems::Table, OrderItems::OrderId)
                                .to(Orders::Table, Orders::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_items_product_id")
                                .from(OrderItems::Table, OrderItems::ProductId)
                                .to(Products::Table, Products::Id)
                                .on_delete(ForeignKeyAction::SetNull)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_order_items_order_id")
                        .table(OrderItems::Table)
                        .col(OrderItems::OrderId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OrderItems::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum OrderItems {
        Table,
        Id,
        OrderId,
        ProductId,
        Position,
        Quantity,
        UnitPrice,
        Discount,
        Total,
    }
}

mod m20250301_000006_create_project_templates_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000006_create_project_templates_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ProjectTemplates::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ProjectTemplates::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProjectTemplates::Name)
                                .string_len(255)
                                .not_null(),
                        )
                        .col(ColumnDef::new(ProjectTemplates::Description).text().null())
                        .col(
                            ColumnDef::new(ProjectTemplates::Category)
                                .string_len(100)
                                .null(),
                        )
                        .col(ColumnDef::new(ProjectTemplates::Items).json().not_null())
                        .col(
                            ColumnDef::new(ProjectTemplates::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(ProjectTemplates::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProjectTemplates::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ProjectTemplates::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum ProjectTemplates {
        Table,
        Id,
        Name,
        Description,
        Category,
        Items,
        Active,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250301_000007_create_projects_table {
    use super::m20250301_000001_create_users_table::Users;
    use super::m20250301_000003_create_clients_table::Clients;
    use super::m20250301_000006_create_project_templates_table::ProjectTemplates;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000007_create_projects_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Projects::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Projects::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Projects::Name).string_len(255).not_null())
                        .col(ColumnDef::new(Projects::ClientId).uuid().null())
                        .col(ColumnDef::new(Projects::TemplateId).uuid().null())
                        .col(ColumnDef::new(Projects::Description).text().null())
                        .col(ColumnDef::new(Projects::Items).json().not_null())
                        .col(
                            ColumnDef::new(Projects::Status)
                                .string_len(20)
                                .not_null()
                                .default("draft")
                                .check(Expr::col(Projects::Status).is_in([
                                    "draft",
                                    "in_progress",
                                    "completed",
                                    "cancelled",
                                ])),
                        )
                        .col(ColumnDef::new(Projects::Notes).text().null())
                        .col(ColumnDef::new(Projects::CreatedBy).uuid().null())
                        .col(
                            ColumnDef::new(Projects::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Projects::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_projects_client_id")
                                .from(Projects::Table, Projects::ClientId)
                                .to(Clients::Table, Clients::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_projects_template_id")
                                .from(Projects::Table, Projects::TemplateId)
                                .to(ProjectTemplates::Table, ProjectTemplates::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_projects_created_by")
                                .from(Projects::Table, Projects::CreatedBy)
                                .to(Users::Table, Users::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Projects::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Projects {
        Table,
        Id,
        Name,
        ClientId,
        TemplateId,
        Description,
        Items,
        Status,
        Notes,
        CreatedBy,
        CreatedAt,
        UpdatedAt,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_ordered_and_uniquely_named() {
        let names: Vec<String> = Migrator::migrations()
            .iter()
            .map(|m| m.name().to_string())
            .collect();
        let mut sorted = names.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(names, sorted);
        assert_eq!(names.len(), 7);
    }
}
