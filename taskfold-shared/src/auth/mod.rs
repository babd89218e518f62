/// Authentication and authorization
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and strength rules
/// - [`jwt`]: access/refresh token issuance and validation
/// - [`middleware`]: bearer token to [`middleware::Principal`] resolution
/// - [`authorization`]: folder and task access control
///
/// # Example
///
/// ```no_run
/// use taskfold_shared::auth::password::{hash_password, verify_password};
/// use taskfold_shared::auth::jwt::{create_token, Claims, TokenType};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("Tasks4ever")?;
/// assert!(verify_password("Tasks4ever", &hash)?);
///
/// let token = create_token(&Claims::new(Uuid::new_v4(), TokenType::Access), "secret")?;
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
