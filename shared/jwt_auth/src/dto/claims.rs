use serde::Deserialize;

///
/// Claims read from the token after its signature and `exp` were validated.
///
#[derive(Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub sub: Option<String>,

    #[serde(default)]
    pub realm_access: Option<JwtClaimsRealmAccess>,
}

#[derive(Deserialize)]
pub struct JwtClaimsRealmAccess {
    #[serde(default)]
    pub roles: Vec<String>,
}
