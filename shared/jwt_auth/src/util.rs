use anyhow::anyhow;
use jsonwebtoken::Algorithm;
use std::str::FromStr;

pub fn parse_jwt_algorithms(jwt_algorithms: String) -> anyhow::Result<Vec<Algorithm>> {
    let mut algorithms = Vec::new();

    for algorithm_str in jwt_algorithms.split(',') {
        let algorithm = Algorithm::from_str(algorithm_str.trim())
            .map_err(|err| anyhow!("invalid algorithm: {err}"))?;
        algorithms.push(algorithm);
    }

    Ok(algorithms)
}

///
/// Key set entries are RSA public keys, so only algorithms verified with them are usable
///
pub fn is_rsa_family(algorithm: Algorithm) -> bool {
    matches!(
        algorithm,
        Algorithm::RS256
            | Algorithm::RS384
            | Algorithm::RS512
            | Algorithm::PS256
            | Algorithm::PS384
            | Algorithm::PS512
    )
}
