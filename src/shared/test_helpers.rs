use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::http::HeaderValue;
use axum::routing::get;
use axum::{Json, Router};
use axum_test::TestServer;
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, DecodingKey, EncodingKey, Header};
use serde_json::{json, Value};

use crate::core::error::{AppError, Result};
use crate::core::middleware::route_not_found;
use crate::features::auth::{JwtValidator, KeySource};
use crate::features::categories::models::Category;
use crate::features::categories::repositories::{CategoryRepository, DUPLICATE_NAME_MESSAGE};
use crate::features::categories::{routes as categories_routes, CategoryService};
use crate::features::users::models::User;
use crate::features::users::repositories::UserRepository;
use crate::features::users::UserService;

pub const TEST_JWT_SECRET: &str = "test-secret-key-for-unit-tests";

/// HS256 token with the given claims, signed with [`TEST_JWT_SECRET`]
pub fn mint_token_with(claims: Value) -> String {
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .expect("token encodes")
}

/// Ten-minute token for the given subject
pub fn mint_token(sub: &str) -> String {
    mint_token_with(json!({
        "sub": sub,
        "exp": Utc::now().timestamp() + 600,
    }))
}

pub fn bearer(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {}", token)).expect("valid header value")
}

pub const TEST_RSA_KID: &str = "test-rsa-key";
const TEST_RSA_PRIVATE_KEY: &str = include_str!("../features/auth/testdata/rsa_private.pem");
const TEST_RSA_MODULUS: &str = "rcdljm-6U3izXn4s1_nmmC_7sr0zWq0oAuNgpN-58yjc718G7DRz7gfXkKlq5TWi_iqKNMrg4GkuCCryB34gEvKqU-9nmeL-fJUFMHozoQ1rcKsjLpVDUF8wXINrk6e0LyNV4-B7ViB0nZVP9HISm80Mm69_86_xC7gc_atg4hR-2sIMqzqzZEJ6wqkxmdduKOCYvVoqkEOIVQR9PRoDMDdOJiaBxqeXNbrTEgu-eopSOVtKTsMgYaGDtsyvbRxKaAgpZ8Mx9bHiI7dCTW0SKy1Uqqjd8TWXbcyaGGH2A-_ogs3TkGtjw4NxPp-xhq0GUg37WokiDksUPZV_TzytCQ";

/// RS256 token signed with the test key, carrying `kid` in its header when given
pub fn mint_rs256_token(claims: Value, kid: Option<&str>) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = kid.map(str::to_string);
    let key = EncodingKey::from_rsa_pem(TEST_RSA_PRIVATE_KEY.as_bytes()).expect("test key parses");
    encode(&header, &claims, &key).expect("token encodes")
}

/// Key set publishing the public half of the test key under [`TEST_RSA_KID`]
pub fn test_jwks() -> Value {
    json!({
        "keys": [{
            "kid": TEST_RSA_KID,
            "kty": "RSA",
            "use": "sig",
            "alg": "RS256",
            "n": TEST_RSA_MODULUS,
            "e": "AQAB",
        }]
    })
}

/// Serves `jwks` at `{issuer}/jwks` on a local port.
///
/// Returns the issuer URL and a counter of fetches.
pub async fn serve_jwks(jwks: Value) -> (String, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let app = Router::new().route(
        "/jwks",
        get(move || {
            let counter = counter.clone();
            let jwks = jwks.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Json(jwks)
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind jwks listener");
    let addr = listener.local_addr().expect("jwks listener address");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (format!("http://{}", addr), hits)
}

/// Category storage backed by a map; counts every trait call
#[derive(Default)]
pub struct InMemoryCategoryRepository {
    rows: Mutex<BTreeMap<i64, Category>>,
    last_id: AtomicI64,
    calls: AtomicUsize,
}

impl InMemoryCategoryRepository {
    /// Insert directly, bypassing the call counter
    pub fn seed(&self, name: &str, description: &str) -> Category {
        let now = Utc::now();
        let category = Category {
            id: self.last_id.fetch_add(1, Ordering::SeqCst) + 1,
            name: name.to_string(),
            description: description.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.rows
            .lock()
            .unwrap()
            .insert(category.id, category.clone());
        category
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    fn ensure_unique(rows: &BTreeMap<i64, Category>, name: &str, except: Option<i64>) -> Result<()> {
        let taken = rows
            .values()
            .any(|c| Some(c.id) != except && c.name.to_lowercase() == name.to_lowercase());
        if taken {
            return Err(AppError::Conflict(DUPLICATE_NAME_MESSAGE.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn insert(&self, name: &str, description: &str) -> Result<Category> {
        self.touch();
        Self::ensure_unique(&self.rows.lock().unwrap(), name, None)?;
        Ok(self.seed(name, description))
    }

    async fn find_all(&self) -> Result<Vec<Category>> {
        self.touch();
        Ok(self.rows.lock().unwrap().values().cloned().collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Category>> {
        self.touch();
        Ok(self.rows.lock().unwrap().get(&id).cloned())
    }

    async fn update(
        &self,
        id: i64,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Option<Category>> {
        self.touch();
        let mut rows = self.rows.lock().unwrap();
        if let Some(name) = name {
            Self::ensure_unique(&rows, name, Some(id))?;
        }
        let Some(category) = rows.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = name {
            category.name = name.to_string();
        }
        if let Some(description) = description {
            category.description = description.to_string();
        }
        category.updated_at = Utc::now();
        Ok(Some(category.clone()))
    }

    async fn delete(&self, id: i64) -> Result<Option<Category>> {
        self.touch();
        Ok(self.rows.lock().unwrap().remove(&id))
    }
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<i64, User>>,
}

impl InMemoryUserRepository {
    pub fn add_user(&self, id: i64, is_active: bool) {
        let now = Utc::now();
        self.users.lock().unwrap().insert(
            id,
            User {
                id,
                email: format!("user{}@example.com", id),
                name: format!("User {}", id),
                is_active,
                created_at: now,
                updated_at: now,
            },
        );
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        Ok(self.users.lock().unwrap().get(&id).cloned())
    }
}

/// Categories router mounted as in production, over in-memory storage.
///
/// User 1 is active, user 2 is disabled.
pub struct TestApp {
    pub server: TestServer,
    pub categories: Arc<InMemoryCategoryRepository>,
}

impl TestApp {
    pub fn new() -> Self {
        let categories = Arc::new(InMemoryCategoryRepository::default());
        let users = InMemoryUserRepository::default();
        users.add_user(1, true);
        users.add_user(2, false);

        let validator = Arc::new(JwtValidator::new(
            KeySource::Secret(DecodingKey::from_secret(TEST_JWT_SECRET.as_bytes())),
            None,
            None,
            0,
        ));

        let router = Router::new()
            .nest(
                "/categories",
                categories_routes::routes(
                    Arc::new(CategoryService::new(categories.clone())),
                    validator,
                    Arc::new(UserService::new(Arc::new(users))),
                ),
            )
            .fallback(route_not_found);

        Self {
            server: TestServer::new(router).expect("test server starts"),
            categories,
        }
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}
