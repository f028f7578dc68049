//! Delete command handlers.

use crate::args::DeleteDeductionArgs;
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};

/// Deletes a paycheck deduction. Net amounts that were already computed keep their value.
pub async fn delete_deduction(config: Config, args: DeleteDeductionArgs) -> Result<Out<i64>> {
    config
        .db()
        .delete_deduction(args.id)
        .await
        .pub_result(ErrorType::Database)?;
    Ok(Out::new(format!("Deleted deduction {}", args.id), args.id))
}
