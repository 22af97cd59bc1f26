use rand::{distributions::Alphanumeric, Rng};

/// 產生指定長度的英數亂數字串
pub fn random_string(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}
