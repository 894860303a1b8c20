use pr_core::RatingError;

pub(crate) const EXIT_CLIENT_ERROR: i32 = 2;
pub(crate) const EXIT_SERVER_ERROR: i32 = 1;

/// Prints the error block and returns the process exit code: 2 when the
/// caller's input was at fault, 1 when the rules or deployment are.
pub(crate) fn emit_error(error: RatingError) -> i32 {
    println!("RESULT:ERROR");
    println!("ERROR_CODE:{}", error.code());
    println!(
        "ERROR_MSG_JSON:{}",
        serde_json::to_string(&error.to_string())
            .unwrap_or_else(|_| "\"Unknown error\"".to_string())
    );
    exit_code_for(&error)
}

pub(crate) fn exit_code_for(error: &RatingError) -> i32 {
    if error.is_client_error() {
        EXIT_CLIENT_ERROR
    } else {
        EXIT_SERVER_ERROR
    }
}

pub(crate) fn map_config(error: anyhow::Error) -> RatingError {
    RatingError::config(format!("{:#}", error))
}

pub(crate) fn map_request_read(error: std::io::Error) -> RatingError {
    RatingError::request(format!("failed to read request: {}", error))
}

pub(crate) fn map_result_encode(error: serde_json::Error) -> RatingError {
    RatingError::request(format!("failed to encode result: {}", error))
}
