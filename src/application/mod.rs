// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// This layer orchestrates all the other layers to accomplish
// a specific goal (fine-tuning or classifying new text).
//
// Rules for this layer:
//   - No tensor code here (that's Layer 5)
//   - No printing here (that's Layer 1)
//   - Only workflow coordination
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// The fit → evaluate → predict orchestrator
pub mod training;

// The end-to-end fine-tuning workflow
pub mod train_use_case;

// Reload a trained model and classify new text
pub mod classify_use_case;
