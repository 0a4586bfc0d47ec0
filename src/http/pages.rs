//! Fan-out test pages.
//!
//! Each page embeds the same Lehmer recurrence as `workload::generator`, so
//! the browser recomputes the expected bytes locally. `{{LENGTH}}` and
//! `{{NUM}}` each occur exactly once per template and are bound to script
//! variables; only validated integers are substituted.

pub const LENGTH_TOKEN: &str = "{{LENGTH}}";
pub const NUM_TOKEN: &str = "{{NUM}}";

macro_rules! prng_script {
    () => {
        r#"
  var length = {{LENGTH}};
  var num = {{NUM}};
  var buf = new ArrayBuffer(length);
  var prng = new Uint8Array(buf);
  var seed = 1;
  for (var i = 0; i < length; i++) {
    // Lehmer generator; the product stays below 2^53, so doubles are exact.
    seed = seed * 48271 % 2147483647;
    prng[i] = seed;
  }
"#
    };
}

/// Issues `num` concurrent POSTs of the sequence to `/uploadhandler`.
pub const UPLOAD_TEMPLATE: &str = concat!(
    r#"<html>
<body>
<script>"#,
    prng_script!(),
    r#"
  for (var i = 0; i < num; i++) {
    var req = new XMLHttpRequest();
    req.open("POST", "/uploadhandler?len=" + length, true);
    req.send(buf);
  }
</script>
</body>
</html>
"#
);

/// Issues `num` concurrent GETs of `/prdata` and writes `dltest ok` once every
/// response matched.
pub const DOWNLOAD_TEMPLATE: &str = concat!(
    r#"<html>
<body>
<script>"#,
    prng_script!(),
    r#"
  function verify(data) {
    if (data.length !== length) return false;
    for (var i = 0; i < length; i++) {
      if (data[i] !== prng[i]) return false;
    }
    return true;
  }

  var nOK = 0;
  for (var i = 0; i < num; i++) {
    let req = new XMLHttpRequest();
    req.responseType = "arraybuffer";
    req.open("GET", "/prdata?len=" + length, true);
    req.onreadystatechange = function () {
      if (req.readyState === XMLHttpRequest.DONE && req.status === 200) {
        if (verify(new Uint8Array(req.response))) {
          nOK++;
          if (nOK === num) {
            document.write("dltest ok");
          }
        }
      }
    };
    req.send();
  }
</script>
</body>
</html>
"#
);

fn render(template: &str, len: usize, num: usize) -> String {
    template
        .replace(LENGTH_TOKEN, &len.to_string())
        .replace(NUM_TOKEN, &num.to_string())
}

pub fn upload_page(len: usize, num: usize) -> String {
    render(UPLOAD_TEMPLATE, len, num)
}

pub fn download_page(len: usize, num: usize) -> String {
    render(DOWNLOAD_TEMPLATE, len, num)
}
