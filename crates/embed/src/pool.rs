use crate::EmbedError;

/// Mean-pool per-token vectors into one vector.
pub fn mean_pool(vectors: &[Vec<f32>]) -> Result<Vec<f32>, EmbedError> {
    let first = vectors
        .first()
        .ok_or_else(|| EmbedError::Inference("no vectors to pool".into()))?;
    if vectors.len() == 1 {
        return Ok(first.clone());
    }

    let dim = first.len();
    let mut pooled = vec![0.0f32; dim];
    for vector in vectors {
        if vector.len() != dim {
            return Err(EmbedError::Inference(format!(
                "cannot pool vectors of dimension {} and {dim}",
                vector.len()
            )));
        }
        for (acc, &val) in pooled.iter_mut().zip(vector.iter()) {
            *acc += val;
        }
    }
    let n = vectors.len() as f32;
    for val in &mut pooled {
        *val /= n;
    }
    Ok(pooled)
}
