use anyhow::{Context, Result};
use std::path::PathBuf;

use sangeet_backend::{
    promote_to_admin, provision_admin, AdminRequest, Config, ProvisionMode, RestAdminClient,
    ServiceCredentials,
};

fn admin_client(config: &Config, credentials: Option<PathBuf>) -> Result<RestAdminClient> {
    let path = credentials.unwrap_or_else(|| config.credentials_path.clone());
    let credentials = ServiceCredentials::load(&path)
        .with_context(|| format!("Failed to load service credentials from {}", path.display()))?;

    RestAdminClient::new(config.backend.clone(), credentials)
        .context("Failed to create admin client")
}

/// Create a privileged account and mark it as admin.
pub async fn create_admin(
    config: &Config,
    credentials: Option<PathBuf>,
    email: String,
    password: String,
    display_name: Option<String>,
    update_existing: bool,
) -> Result<()> {
    let client = admin_client(config, credentials)?;

    let mut request = AdminRequest::new(email, password);
    if let Some(name) = display_name {
        request = request.with_display_name(name);
    }

    let mode = if update_existing {
        ProvisionMode::Upsert
    } else {
        ProvisionMode::CreateOnly
    };

    println!("\n🔐 Provisioning admin account\n");
    println!("  Project: {}", client.backend().project_id);
    println!("  Email:   {}", request.email);
    println!();

    let account = provision_admin(&client, &request, mode)
        .await
        .context("Admin provisioning failed")?;

    println!("✓ {} is now an admin", account.email);
    println!("  uid: {}", account.uid);

    Ok(())
}

/// Give an existing account the admin role.
pub async fn promote(config: &Config, credentials: Option<PathBuf>, email: String) -> Result<()> {
    let client = admin_client(config, credentials)?;

    let account = promote_to_admin(&client, &email)
        .await
        .context("Failed to promote account")?;

    println!("✓ {} is now an admin", account.email);
    println!("  uid: {}", account.uid);

    Ok(())
}
