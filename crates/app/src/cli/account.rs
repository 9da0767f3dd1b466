use clap::Args;
use storefront::prelude::Identity;
use storefront_app::{
    auth::{AuthGrant, Credentials, Registration},
    context::AppContext,
};
use tracing::warn;

#[derive(Debug, Args)]
pub(crate) struct LoginArgs {
    /// Account email address
    #[arg(long)]
    email: String,

    /// Account password
    #[arg(long, env = "STOREFRONT_PASSWORD", hide_env_values = true)]
    password: String,
}

#[derive(Debug, Args)]
pub(crate) struct RegisterArgs {
    /// Display name
    #[arg(long)]
    name: String,

    /// Account email address
    #[arg(long)]
    email: String,

    /// Account password
    #[arg(long, env = "STOREFRONT_PASSWORD", hide_env_values = true)]
    password: String,
}

pub(crate) async fn login(context: &AppContext, args: LoginArgs) -> Result<(), String> {
    let grant = context
        .login(&Credentials {
            email: args.email,
            password: args.password,
        })
        .await
        .map_err(|error| error.to_string())?;

    sign_in(context, grant).await
}

pub(crate) async fn register(context: &AppContext, args: RegisterArgs) -> Result<(), String> {
    let grant = context
        .register(&Registration {
            name: args.name,
            email: args.email,
            password: args.password,
        })
        .await
        .map_err(|error| error.to_string())?;

    sign_in(context, grant).await
}

async fn sign_in(context: &AppContext, grant: AuthGrant) -> Result<(), String> {
    println!("signed in as {}", describe(&grant.identity));

    match context.cart.set_identity(Some(grant.identity)).await {
        Ok(()) => println!("cart items: {}", context.cart.count()),
        Err(error) => warn!(%error, "signed in but the cart could not be loaded"),
    }

    Ok(())
}

pub(crate) fn logout(context: &AppContext) -> Result<(), String> {
    match context.logout().map_err(|error| error.to_string())? {
        Some(saved) => println!("signed out {}", describe(&saved.identity)),
        None => println!("not signed in"),
    }

    Ok(())
}

pub(crate) fn whoami(context: &AppContext) -> Result<(), String> {
    let saved = context
        .session_file
        .load()
        .map_err(|error| error.to_string())?;

    match saved {
        Some(saved) => {
            println!("{}", describe(&saved.identity));
            println!("signed in since {}", saved.saved_at);
        }
        None => println!("not signed in"),
    }

    Ok(())
}

fn describe(identity: &Identity) -> String {
    let admin = if identity.is_admin { " (admin)" } else { "" };

    format!("{} <{}>{admin}", identity.name, identity.email)
}
