// ============================================================
// Layer 5 — Transformer Sequence Classifier
// ============================================================
// A DistilBERT-shaped encoder with a sequence classification head:
//
//   input_ids [B, S]
//     → word embedding + position embedding → LayerNorm → dropout
//     → N × EncoderBlock (self-attention with padding mask, GELU FFN)
//     → hidden state of the first ([CLS]) position  [B, D]
//     → pre_classifier (D → D) → ReLU → dropout
//     → classifier (D → num_labels)                 [B, 2]
//
// The encoder half (TransformerEncoder) carries the same module
// names as a DistilBERT checkpoint (embeddings, sa_layer_norm,
// lin1/lin2, output_layer_norm), so pretrained weights load into it
// with a handful of key renames. The head always starts fresh.
//
// The padding mask keeps attention away from [PAD] positions, so
// logits do not depend on how much padding a sequence carries.
//
// Reference: Burn Book §3 (Building Blocks)
//            Vaswani et al. (2017) Attention Is All You Need
//            Sanh et al. (2019) DistilBERT

use burn::{
    nn::{
        attention::{MhaInput, MultiHeadAttention, MultiHeadAttentionConfig},
        loss::CrossEntropyLossConfig,
        Dropout, DropoutConfig,
        Embedding, EmbeddingConfig,
        LayerNorm, LayerNormConfig,
        Linear, LinearConfig,
        Relu,
    },
    prelude::*,
    train::ClassificationOutput,
};

use crate::data::batcher::ClassificationBatch;
use crate::domain::record::NUM_LABELS;

#[derive(Config, Debug)]
pub struct ClassifierConfig {
    pub vocab_size:              usize,
    /// Rows of the position table; inputs may be at most this long
    pub max_position_embeddings: usize,
    #[config(default = 256)]
    pub d_model:                 usize,
    #[config(default = 8)]
    pub num_heads:               usize,
    #[config(default = 4)]
    pub num_layers:              usize,
    #[config(default = 1024)]
    pub d_ff:                    usize,
    #[config(default = 0.1)]
    pub dropout:                 f64,
    /// Dropout in front of the classifier
    #[config(default = 0.2)]
    pub classifier_dropout:      f64,
    #[config(default = 1e-12)]
    pub layer_norm_eps:          f64,
    #[config(default = 2)]
    pub num_labels:              usize,
}

impl ClassifierConfig {
    /// Configuration for a binary classifier over `vocab_size` tokens.
    pub fn binary(vocab_size: usize, max_position_embeddings: usize) -> Self {
        Self::new(vocab_size, max_position_embeddings).with_num_labels(NUM_LABELS)
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> TextClassifier<B> {
        TextClassifier {
            encoder:        self.init_encoder(device),
            pre_classifier: LinearConfig::new(self.d_model, self.d_model).init(device),
            classifier:     LinearConfig::new(self.d_model, self.num_labels).init(device),
            dropout:        DropoutConfig::new(self.classifier_dropout).init(),
            activation:     Relu::new(),
        }
    }

    pub fn init_encoder<B: Backend>(&self, device: &B::Device) -> TransformerEncoder<B> {
        let embeddings = Embeddings {
            word_embeddings:     EmbeddingConfig::new(self.vocab_size, self.d_model).init(device),
            position_embeddings: EmbeddingConfig::new(self.max_position_embeddings, self.d_model).init(device),
            layer_norm:          self.layer_norm(device),
            dropout:             DropoutConfig::new(self.dropout).init(),
        };
        let layers = (0..self.num_layers).map(|_| self.init_block(device)).collect();
        TransformerEncoder { embeddings, layers }
    }

    fn layer_norm<B: Backend>(&self, device: &B::Device) -> LayerNorm<B> {
        LayerNormConfig::new(self.d_model)
            .with_epsilon(self.layer_norm_eps)
            .init(device)
    }

    fn init_block<B: Backend>(&self, device: &B::Device) -> EncoderBlock<B> {
        EncoderBlock {
            attention: MultiHeadAttentionConfig::new(self.d_model, self.num_heads)
                .with_dropout(self.dropout)
                .init(device),
            sa_layer_norm:     self.layer_norm(device),
            lin1:              LinearConfig::new(self.d_model, self.d_ff).init(device),
            lin2:              LinearConfig::new(self.d_ff, self.d_model).init(device),
            output_layer_norm: self.layer_norm(device),
            dropout:           DropoutConfig::new(self.dropout).init(),
        }
    }
}

#[derive(Module, Debug)]
pub struct Embeddings<B: Backend> {
    pub word_embeddings:     Embedding<B>,
    pub position_embeddings: Embedding<B>,
    pub layer_norm:          LayerNorm<B>,
    pub dropout:             Dropout,
}

impl<B: Backend> Embeddings<B> {
    /// input_ids: [batch, seq_len] → [batch, seq_len, d_model]
    pub fn forward(&self, input_ids: Tensor<B, 2, Int>) -> Tensor<B, 3> {
        let [batch_size, seq_len] = input_ids.dims();
        let positions = Tensor::<B, 1, Int>::arange(0..seq_len as i64, &input_ids.device())
            .unsqueeze::<2>()
            .expand([batch_size, seq_len]);

        let x = self.word_embeddings.forward(input_ids) + self.position_embeddings.forward(positions);
        self.dropout.forward(self.layer_norm.forward(x))
    }
}

/// Post-norm transformer layer, DistilBERT ordering.
#[derive(Module, Debug)]
pub struct EncoderBlock<B: Backend> {
    pub attention:         MultiHeadAttention<B>,
    pub sa_layer_norm:     LayerNorm<B>,
    pub lin1:              Linear<B>,
    pub lin2:              Linear<B>,
    pub output_layer_norm: LayerNorm<B>,
    pub dropout:           Dropout,
}

impl<B: Backend> EncoderBlock<B> {
    /// x: [batch, seq_len, d_model], mask_pad: [batch, seq_len] (true = padding)
    pub fn forward(&self, x: Tensor<B, 3>, mask_pad: Tensor<B, 2, Bool>) -> Tensor<B, 3> {
        let input   = MhaInput::self_attn(x.clone()).mask_pad(mask_pad);
        let context = self.attention.forward(input).context;
        let x = self.sa_layer_norm.forward(x + context);

        let hidden = burn::tensor::activation::gelu(self.lin1.forward(x.clone()));
        let ffn    = self.dropout.forward(self.lin2.forward(hidden));
        self.output_layer_norm.forward(x + ffn)
    }
}

/// Embeddings plus the stack of encoder layers.
#[derive(Module, Debug)]
pub struct TransformerEncoder<B: Backend> {
    pub embeddings: Embeddings<B>,
    pub layers:     Vec<EncoderBlock<B>>,
}

impl<B: Backend> TransformerEncoder<B> {
    /// Hidden states: [batch, seq_len, d_model]
    pub fn forward(&self, input_ids: Tensor<B, 2, Int>, mask_pad: Tensor<B, 2, Bool>) -> Tensor<B, 3> {
        let mut x = self.embeddings.forward(input_ids);
        for layer in &self.layers {
            x = layer.forward(x, mask_pad.clone());
        }
        x
    }
}

#[derive(Module, Debug)]
pub struct TextClassifier<B: Backend> {
    pub encoder:        TransformerEncoder<B>,
    pub pre_classifier: Linear<B>,
    pub classifier:     Linear<B>,
    pub dropout:        Dropout,
    pub activation:     Relu,
}

impl<B: Backend> TextClassifier<B> {
    /// input_ids, mask_pad: [batch, seq_len] → logits: [batch, num_labels]
    pub fn forward(&self, input_ids: Tensor<B, 2, Int>, mask_pad: Tensor<B, 2, Bool>) -> Tensor<B, 2> {
        let hidden = self.encoder.forward(input_ids, mask_pad);

        // [CLS] pooling: hidden state of position 0
        let [batch_size, _, d_model] = hidden.dims();
        let pooled = hidden.slice([0..batch_size, 0..1, 0..d_model]).reshape([batch_size, d_model]);

        let pooled = self.activation.forward(self.pre_classifier.forward(pooled));
        self.classifier.forward(self.dropout.forward(pooled))
    }

    /// Forward pass plus mean cross-entropy against the batch labels.
    pub fn forward_classification(&self, batch: ClassificationBatch<B>) -> ClassificationOutput<B> {
        let logits = self.forward(batch.input_ids, batch.mask_pad);
        let loss   = CrossEntropyLossConfig::new()
            .init(&logits.device())
            .forward(logits.clone(), batch.labels.clone());
        ClassificationOutput::new(loss, logits, batch.labels)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn tiny_config() -> ClassifierConfig {
        ClassifierConfig::binary(32, 6)
            .with_d_model(16)
            .with_num_heads(2)
            .with_num_layers(1)
            .with_d_ff(32)
            .with_dropout(0.0)
            .with_classifier_dropout(0.0)
    }

    #[test]
    fn test_logits_shape() {
        let device = Default::default();
        let model  = tiny_config().init::<TestBackend>(&device);

        let ids  = Tensor::<TestBackend, 2, Int>::zeros([3, 6], &device);
        let mask = Tensor::<TestBackend, 2, Int>::zeros([3, 6], &device).equal_elem(1);
        assert_eq!(model.forward(ids, mask).dims(), [3, 2]);
    }

    #[test]
    fn test_padding_does_not_change_logits() {
        let device = Default::default();
        let model  = tiny_config().init::<TestBackend>(&device);

        // Same real tokens, different garbage in the padded tail
        let ids_a = Tensor::<TestBackend, 2, Int>::from_data(
            TensorData::new(vec![2i64, 7, 3, 0, 0, 0], [1, 6]), &device);
        let ids_b = Tensor::<TestBackend, 2, Int>::from_data(
            TensorData::new(vec![2i64, 7, 3, 9, 11, 5], [1, 6]), &device);
        let mask = Tensor::<TestBackend, 2, Int>::from_data(
            TensorData::new(vec![0i64, 0, 0, 1, 1, 1], [1, 6]), &device).equal_elem(1);

        let a: Vec<f32> = model.forward(ids_a, mask.clone()).into_data().to_vec().unwrap();
        let b: Vec<f32> = model.forward(ids_b, mask).into_data().to_vec().unwrap();
        for (x, y) in a.iter().zip(&b) {
            assert!((x - y).abs() < 1e-4, "{a:?} vs {b:?}");
        }
    }

    #[test]
    fn test_layers_follow_config() {
        let model = tiny_config().with_num_layers(3).init::<TestBackend>(&Default::default());
        assert_eq!(model.encoder.layers.len(), 3);
        assert_eq!(model.encoder.embeddings.position_embeddings.weight.dims(), [6, 16]);
        assert_eq!(model.encoder.layers[0].lin1.weight.dims(), [16, 32]);
    }
}
