use corpus_match::{
    CoordinateMapper, GridMetrics, Position, RopeBuffer, TextBuffer, clamp_to_line,
    last_position, predecessor, successor,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const TEXT: &str = "fn main() {\n    let 你好 = 1;\n\n    println!(\"{}\", 你好);\n}";

fn mappers() -> Vec<CoordinateMapper> {
    [None, Some(5), Some(12)]
        .into_iter()
        .map(|wrap_columns| {
            CoordinateMapper::new(GridMetrics {
                wrap_columns,
                ..GridMetrics::default()
            })
        })
        .collect()
}

/// All legal positions in buffer order.
fn legal_positions(buffer: &RopeBuffer) -> Vec<Position> {
    let mut out = vec![buffer.position(0, 0)];
    while let Ok(next) = successor(buffer, out.last().unwrap()) {
        out.push(next);
    }
    out
}

#[test]
fn test_successor_walk_covers_every_character() {
    let buffer = RopeBuffer::from_text(TEXT);
    let positions = legal_positions(&buffer);
    assert_eq!(positions.len(), buffer.char_count());
    for (index, p) in positions.iter().enumerate() {
        assert_eq!(p.index, index);
        assert_eq!(buffer.position_from_index(index), *p);
    }
    assert_eq!(*positions.last().unwrap(), last_position(&buffer));
}

#[test]
fn test_predecessor_inverts_successor() {
    let buffer = RopeBuffer::from_text(TEXT);
    for pair in legal_positions(&buffer).windows(2) {
        assert_eq!(predecessor(&buffer, &pair[1]).unwrap(), pair[0]);
        assert_eq!(predecessor(&buffer, &pair[1]).unwrap().index, pair[0].index);
    }
}

#[test]
fn test_round_trip_recovers_containing_rect() {
    let buffer = RopeBuffer::from_text(TEXT);
    let mut rng = StdRng::seed_from_u64(7);

    for mapper in mappers() {
        for p in legal_positions(&buffer) {
            let rect = mapper.pixel_from_position(&buffer, &p);
            if rect.width() == 0.0 {
                continue;
            }
            for _ in 0..4 {
                let x = rng.gen_range(rect.left..rect.right);
                let y = rng.gen_range(rect.top..rect.bottom);
                let hit = mapper.position_from_pixel(&buffer, x, y);
                assert_eq!(hit, p, "({}, {}) mapped to {} instead of {}", x, y, hit, p);
                assert!(mapper.pixel_from_position(&buffer, &hit).contains(x, y));
            }
        }
    }
}

#[test]
fn test_position_from_pixel_always_legal_line_position() {
    let buffer = RopeBuffer::from_text(TEXT);
    let mut rng = StdRng::seed_from_u64(11);

    for mapper in mappers() {
        for _ in 0..500 {
            let x = rng.gen_range(-100.0..1000.0);
            let y = rng.gen_range(-100.0..1000.0);
            let p = mapper.position_from_pixel(&buffer, x, y);
            assert!(p.line < buffer.line_count());
            assert!(p.column <= buffer.line_len(p.line));
            assert_eq!(p.index, buffer.index_from_position(p.line, p.column));
        }
    }
}

#[test]
fn test_clamp_to_line_is_idempotent() {
    let buffer = RopeBuffer::from_text(TEXT);
    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..500 {
        let p = Position::new(rng.gen_range(0..10), rng.gen_range(0..40), 0);
        let once = clamp_to_line(&buffer, &p);
        let twice = clamp_to_line(&buffer, &once);
        assert_eq!(once, twice);
        assert_eq!(once.index, twice.index);
    }
}

#[test]
fn test_empty_line_newline_rect() {
    let buffer = RopeBuffer::from_text(TEXT);
    let mapper = CoordinateMapper::default();
    let rect = mapper.pixel_from_position(&buffer, &buffer.position(2, 0));
    assert_eq!(rect.left, 0.0);
    assert_eq!(rect.width(), mapper.char_width());
    assert_eq!(rect.top, 2.0 * mapper.line_height());
}
