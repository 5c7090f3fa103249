use anyhow::Result;
use vibeexpr::complex;
use vibeexpr::expression::{
    CloneReason, Expression, ExpressionBuilder, ExpressionSpanArgument, Span, Symbol,
};
use vibeexpr::serialization::{
    SerializationError, SerializedExpression, WireHeader, HEADER_SIZE, MAX_DEPTH,
};

fn corpus() -> Vec<Expression> {
    let mut deep = Expression::from(0);
    for depth in 1..64 {
        deep = complex!("Nest", deep, depth).into();
    }

    let mut mixed = ExpressionBuilder::new("Mixed").spans([
        ExpressionSpanArgument::from(Span::from_vec(vec![1i64, 2, 3])),
        ExpressionSpanArgument::from(Span::from_vec(vec![true, false])),
        ExpressionSpanArgument::from(Span::from_vec(vec!["a".to_string(), "b".to_string()])),
    ]);
    mixed
        .dynamic_arguments_mut()
        .extend([Expression::from(2.5), Expression::from(Symbol::new("x"))]);

    vec![
        Expression::from(5),
        Expression::from("a string"),
        complex!("HeadOnly").into(),
        deep,
        mixed.into(),
        ExpressionBuilder::new("Static")
            .call((1i64, 2.5f64, "s".to_string(), Symbol::new("y")))
            .into(),
    ]
}

#[test]
fn test_round_trip_corpus() -> Result<()> {
    for expr in corpus() {
        let serialized = SerializedExpression::new(expr.clone(CloneReason::ForTesting))?;
        assert_eq!(serialized.deserialize()?, expr);
        let lazy = serialized.lazily_deserialize()?;
        assert_eq!(lazy, expr);
        assert_ne!(lazy, Expression::from(complex!("Unrelated", 1)));
    }
    Ok(())
}

#[test]
fn test_file_round_trip() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("plan.vx");
    let plan: Expression = complex!(
        "Select",
        complex!("Table", complex!("A", complex!("List", 1, 2))),
        complex!("Function", true)
    )
    .into();
    SerializedExpression::new(plan.clone(CloneReason::ForTesting))?.write_to(&path)?;
    let read = SerializedExpression::read_from(&path)?;
    assert_eq!(read.lazily_deserialize()?, plan);
    Ok(())
}

#[test]
fn test_rejects_foreign_buffers() -> Result<()> {
    let bytes = SerializedExpression::new(Expression::from(5))?.into_bytes();

    let mut wrong_magic = bytes.to_vec();
    wrong_magic[0] = b'X';
    assert!(matches!(
        SerializedExpression::from_bytes(wrong_magic),
        Err(SerializationError::BadMagic { .. })
    ));

    let mut corrupt_body = bytes.to_vec();
    corrupt_body[HEADER_SIZE] = 42;
    let serialized = SerializedExpression::from_bytes(corrupt_body)?;
    assert!(serialized.deserialize().is_err());
    assert!(serialized.lazily_deserialize().is_err());

    assert!(SerializedExpression::from_bytes(&b"VXPR"[..]).is_err());
    Ok(())
}

fn nested(depth: usize) -> Expression {
    let mut expr = Expression::from("leaf");
    for _ in 0..depth {
        expr = complex!("Nest", expr).into();
    }
    expr
}

#[test]
fn test_deepest_expression_round_trips() -> Result<()> {
    let expr = nested(MAX_DEPTH);
    let serialized = SerializedExpression::new(expr.clone(CloneReason::ForTesting))?;
    assert_eq!(serialized.deserialize()?, expr);
    assert_eq!(serialized.lazily_deserialize()?, expr);

    assert!(matches!(
        SerializedExpression::new(nested(MAX_DEPTH + 1)),
        Err(SerializationError::TooDeep { .. })
    ));
    Ok(())
}

#[test]
fn test_deeply_nested_buffer_is_rejected() -> Result<()> {
    for depth in [MAX_DEPTH + 1, 5_000, 200_000] {
        let mut body = Vec::new();
        for _ in 0..depth {
            body.extend_from_slice(&[5, 1, 0, 0, 0, b'N', 1, 0, 0, 0, 0, 0, 0, 0]);
        }
        body.extend_from_slice(&[0, 1]);
        let mut buffer = WireHeader::new(body.len() as u64).encode()?;
        buffer.extend_from_slice(&body);

        let serialized = SerializedExpression::from_bytes(buffer)?;
        assert!(matches!(
            serialized.deserialize(),
            Err(SerializationError::TooDeep { depth }) if depth == MAX_DEPTH + 1
        ));
        assert!(matches!(
            serialized.lazily_deserialize(),
            Err(SerializationError::TooDeep { .. })
        ));
    }
    Ok(())
}
